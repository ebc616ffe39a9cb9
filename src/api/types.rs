// Wire types for the contest platform's REST endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A roster category partitioning the player pool (e.g. code "MEN").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSlot {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// A player as returned by `GET /api/players`.
///
/// `gender` is required by the data contract but arrives as an arbitrary
/// string; the loader validates it against the slot's expected gender and
/// treats absence or mismatch as a fatal data error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPlayer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Response of `GET /api/players/hot/ids`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotPlayerIds {
    pub player_ids: Vec<String>,
    #[serde(default)]
    pub threshold: Option<u32>,
}

/// One entry of the per-contest player points list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPointsItem {
    pub player_id: String,
    #[serde(default)]
    pub points: Option<f64>,
}

/// A single points update within a batched upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsUpdate {
    pub player_id: String,
    pub points: f64,
}

/// Request body of `POST .../contests/{id}/player-points`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsUpsertRequest {
    pub updates: Vec<PointsUpdate>,
}

/// Request body for team create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPayload {
    pub team_name: String,
    /// Combined player ids, men first then women, each in selection order.
    pub player_ids: Vec<String>,
    pub captain_id: String,
    pub vice_captain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_id: Option<String>,
}

/// A persisted team as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: String,
    pub team_name: String,
    pub player_ids: Vec<String>,
    pub captain_id: String,
    pub vice_captain_id: String,
}

/// Acknowledgement of a contest enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub id: String,
    pub contest_id: String,
    pub team_id: String,
}

/// A contest summary as listed for the admin points editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub name: String,
    /// Live, Ongoing, Completed, Cancelled.
    pub status: String,
    pub contest_type: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Daily contests restrict editing to these team affiliations.
    #[serde(default)]
    pub allowed_teams: Option<Vec<String>>,
}

impl Contest {
    /// Whether `team` may be edited under this contest's restrictions.
    ///
    /// Only daily contests with a non-empty allowed-teams list restrict
    /// anything; every other contest admits all teams. Allowed entries are
    /// compared after trimming, matching how the backend stores them.
    pub fn admits_team(&self, team: &str) -> bool {
        if self.contest_type != "daily" {
            return true;
        }
        match &self.allowed_teams {
            Some(allowed) if !allowed.is_empty() => {
                allowed.iter().any(|t| t.trim() == team)
            }
            _ => true,
        }
    }
}
