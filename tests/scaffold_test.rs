// Integration tests for the squad builder scaffold.

/// Verify that config/squad.toml is valid TOML.
#[test]
fn squad_toml_is_valid() {
    let content =
        std::fs::read_to_string("config/squad.toml").expect("config/squad.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(
        parsed.is_ok(),
        "config/squad.toml is not valid TOML: {:?}",
        parsed.err()
    );
}

/// Verify that the shipped config loads through the strict loader.
#[test]
fn shipped_config_loads() {
    let config = squad_builder::config::load_config_from(std::path::Path::new("."))
        .expect("shipped config should load");
    assert_eq!(config.rules.men_quota, 12);
    assert_eq!(config.rules.women_quota, 4);
    assert_eq!(config.rules.max_per_team, 3);
}
