// Bulk player import for the admin dashboard.
//
// Reads the standard import template (CSV with name/team/points/slot_code/
// gender/... columns), validating row by row. Invalid rows are reported and
// skipped; valid rows survive, so one bad line does not sink a whole upload.

use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::roster::load::{MEN_SLOT_CODE, WOMEN_SLOT_CODE};
use crate::roster::player::Gender;

const ALLOWED_STATUSES: [&str; 3] = ["Active", "Inactive", "Injured"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Csv(#[from] csv::Error),
}

/// A validated, normalized player row ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPlayer {
    pub name: String,
    pub team: String,
    pub points: f64,
    pub slot_code: String,
    pub gender: Gender,
    pub status: String,
    pub image_url: Option<String>,
    pub matches: u32,
    pub runs: u32,
    pub wickets: u32,
}

/// One rejected row: which row, which field, and why.
#[derive(Debug, Clone)]
pub struct ImportRowError {
    /// 1-based file line, counting the header as line 1.
    pub row: usize,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub players: Vec<ImportedPlayer>,
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Raw row as it appears in the file. Everything is an optional string so
/// that numeric junk surfaces as a row error instead of a reader failure.
/// Template columns we have no use for (slot_name, mobile) are simply not
/// mapped; the reader ignores unknown headers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    name: Option<String>,
    team: Option<String>,
    points: Option<String>,
    slot_code: Option<String>,
    gender: Option<String>,
    status: Option<String>,
    image_url: Option<String>,
    matches: Option<String>,
    runs: Option<String>,
    wickets: Option<String>,
}

/// Parse and validate an import file.
pub fn parse_players<R: Read>(reader: R) -> Result<ImportReport, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ImportReport::default();
    for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
        let row = index + 2; // header is line 1
        match record {
            Ok(raw) => match validate_row(raw) {
                Ok(player) => report.players.push(player),
                Err((field, message)) => report.errors.push(ImportRowError {
                    row,
                    field,
                    message,
                }),
            },
            Err(e) => report.errors.push(ImportRowError {
                row,
                field: "row".to_string(),
                message: e.to_string(),
            }),
        }
    }
    Ok(report)
}

type FieldError = (String, String);

fn validate_row(raw: RawRow) -> Result<ImportedPlayer, FieldError> {
    let name = required_text("name", raw.name)?;
    let team = required_text("team", raw.team)?;

    let gender = match raw.gender.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Gender::parse(value)
            .ok_or_else(|| field_err("gender", format!("invalid gender '{value}'")))?,
        _ => return Err(field_err("gender", "gender is required")),
    };

    let slot_code = match raw.slot_code.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_ascii_uppercase(),
        _ => return Err(field_err("slot_code", "slot code is required")),
    };
    let expected = match slot_code.as_str() {
        MEN_SLOT_CODE => Gender::Male,
        WOMEN_SLOT_CODE => Gender::Female,
        other => {
            return Err(field_err(
                "slot_code",
                format!("unknown slot code '{other}'"),
            ))
        }
    };
    if gender != expected {
        return Err(field_err(
            "gender",
            format!("gender does not match slot '{slot_code}'"),
        ));
    }

    let points = non_negative_number("points", raw.points)?;
    let status = normalize_status(raw.status)?;
    let image_url = raw.image_url.filter(|url| !url.trim().is_empty());

    Ok(ImportedPlayer {
        name,
        team,
        points,
        slot_code,
        gender,
        status,
        image_url,
        matches: non_negative_count("matches", raw.matches)?,
        runs: non_negative_count("runs", raw.runs)?,
        wickets: non_negative_count("wickets", raw.wickets)?,
    })
}

fn field_err(field: &str, message: impl Into<String>) -> FieldError {
    (field.to_string(), message.into())
}

fn required_text(field: &str, value: Option<String>) -> Result<String, FieldError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(field_err(field, format!("{field} is required")));
    }
    if value.len() > 100 {
        return Err(field_err(field, format!("{field} must be 1-100 characters")));
    }
    Ok(value)
}

fn non_negative_number(field: &str, value: Option<String>) -> Result<f64, FieldError> {
    let Some(text) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(0.0);
    };
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() && number >= 0.0 => Ok(number),
        _ => Err(field_err(field, "must be a number >= 0")),
    }
}

fn non_negative_count(field: &str, value: Option<String>) -> Result<u32, FieldError> {
    let Some(text) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(0);
    };
    text.parse::<u32>()
        .map_err(|_| field_err(field, "must be a whole number >= 0"))
}

fn normalize_status(value: Option<String>) -> Result<String, FieldError> {
    let Some(text) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok("Active".to_string());
    };
    ALLOWED_STATUSES
        .iter()
        .find(|allowed| allowed.eq_ignore_ascii_case(text))
        .map(|allowed| allowed.to_string())
        .ok_or_else(|| {
            field_err(
                "status",
                format!(
                    "invalid status '{text}'; allowed: {}",
                    ALLOWED_STATUSES.join(", ")
                ),
            )
        })
}
