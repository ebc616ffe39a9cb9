// Configuration loading and parsing (config/squad.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub rules: SelectionRules,
    pub api: ApiConfig,
    pub db_path: String,
}

/// Roster-construction limits enforced by the selection engine.
///
/// The standard contest format is 12 men + 4 women with at most 3 players
/// from any one team within a gender. These are deployment configuration,
/// not contest data: the backend's contests carry their own allowed-teams
/// lists but the builder's quotas are fixed per deployment.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectionRules {
    pub men_quota: usize,
    pub women_quota: usize,
    pub max_per_team: usize,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            men_quota: 12,
            women_quota: 4,
            max_per_team: 3,
        }
    }
}

impl SelectionRules {
    /// Total squad size (both genders).
    pub fn total(&self) -> usize {
        self.men_quota + self.women_quota
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: SelectionRules::default(),
            api: ApiConfig::default(),
            db_path: default_db_path(),
        }
    }
}

/// Default database location: the platform data directory when resolvable,
/// otherwise a file in the working directory.
fn default_db_path() -> String {
    directories::ProjectDirs::from("", "", "squad-builder")
        .map(|dirs| {
            dirs.data_dir()
                .join("squad-builder.db")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "squad-builder.db".to_string())
}

// ---------------------------------------------------------------------------
// squad.toml file structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire squad.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SquadFile {
    rules: SelectionRules,
    api: ApiConfig,
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/squad.toml` relative to the
/// given `base_dir`.
///
/// This is the strict loading primitive: a missing file is an error. Prefer
/// `load_config()` which falls back to compiled defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("squad.toml");
    let text = read_file(&path)?;
    let file: SquadFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        rules: file.rules,
        api: file.api,
        db_path: file.database.path,
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from the current working directory, falling back to
/// compiled defaults when no config file exists. Parse and validation
/// failures of an existing file are still errors.
pub fn load_config() -> Result<Config, ConfigError> {
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match load_config_from(&base_dir) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound { path }) => {
            info!("no config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let rules = &config.rules;
    if rules.men_quota == 0 {
        return Err(ConfigError::ValidationError {
            field: "rules.men_quota".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if rules.women_quota == 0 {
        return Err(ConfigError::ValidationError {
            field: "rules.women_quota".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if rules.max_per_team == 0 {
        return Err(ConfigError::ValidationError {
            field: "rules.max_per_team".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.api.base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_secs".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
