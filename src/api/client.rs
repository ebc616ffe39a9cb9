// HTTP client for the contest platform backend.
//
// `ContestApi` is the seam between the engines and the transport: the
// production `HttpApi` maps each method onto one REST endpoint, and the
// integration tests substitute an in-memory fake. Error bodies carry a
// `detail` field (string, object, or a list of `{msg}` entries); it is
// extracted here so callers can surface the server's own message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{
    ApiPlayer, ApiSlot, Contest, EnrollmentResponse, HotPlayerIds, PlayerPointsItem,
    PointsUpsertRequest, TeamPayload, TeamResponse,
};
use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
}

impl ApiError {
    /// The server-provided detail message, when the error carries one.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            ApiError::Transport(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// The backend contracts consumed by the selection and points engines.
#[async_trait]
pub trait ContestApi: Send + Sync {
    async fn fetch_slots(&self) -> Result<Vec<ApiSlot>, ApiError>;

    async fn fetch_players_by_slot(
        &self,
        slot_id: &str,
        contest_id: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Vec<ApiPlayer>, ApiError>;

    async fn fetch_hot_player_ids(
        &self,
        contest_id: Option<&str>,
    ) -> Result<HotPlayerIds, ApiError>;

    async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError>;

    async fn fetch_player_points(
        &self,
        contest_id: &str,
    ) -> Result<Vec<PlayerPointsItem>, ApiError>;

    async fn upsert_player_points(
        &self,
        contest_id: &str,
        request: &PointsUpsertRequest,
    ) -> Result<(), ApiError>;

    async fn create_team(&self, payload: &TeamPayload) -> Result<TeamResponse, ApiError>;

    async fn update_team(
        &self,
        team_id: &str,
        payload: &TeamPayload,
    ) -> Result<TeamResponse, ApiError>;

    async fn enroll_team(
        &self,
        contest_id: &str,
        team_id: &str,
    ) -> Result<EnrollmentResponse, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// Production `ContestApi` implementation over reqwest.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client from the `[api]` config section. The base URL is
    /// stored without a trailing slash so endpoint paths can be appended
    /// verbatim.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the response status, extracting the server detail on failure,
    /// then decode the JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(status, &body),
        })
    }
}

#[async_trait]
impl ContestApi for HttpApi {
    async fn fetch_slots(&self) -> Result<Vec<ApiSlot>, ApiError> {
        let response = self.http.get(self.url("/api/slots")).send().await?;
        Self::decode(response).await
    }

    async fn fetch_players_by_slot(
        &self,
        slot_id: &str,
        contest_id: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Vec<ApiPlayer>, ApiError> {
        let mut query: Vec<(&str, &str)> = vec![("slot", slot_id)];
        if let Some(contest_id) = contest_id {
            query.push(("contest_id", contest_id));
        }
        if let Some(gender) = gender {
            query.push(("gender", gender));
        }
        let response = self
            .http
            .get(self.url("/api/players"))
            .query(&query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_hot_player_ids(
        &self,
        contest_id: Option<&str>,
    ) -> Result<HotPlayerIds, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(contest_id) = contest_id {
            query.push(("contest_id", contest_id));
        }
        let response = self
            .http
            .get(self.url("/api/players/hot/ids"))
            .query(&query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError> {
        #[derive(Deserialize)]
        struct ContestListResponse {
            contests: Vec<Contest>,
        }
        let response = self
            .http
            .get(self.url("/api/admin/contests"))
            .query(&[("page_size", "50")])
            .send()
            .await?;
        let list: ContestListResponse = Self::decode(response).await?;
        Ok(list.contests)
    }

    async fn fetch_player_points(
        &self,
        contest_id: &str,
    ) -> Result<Vec<PlayerPointsItem>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/admin/contests/{contest_id}/player-points")))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn upsert_player_points(
        &self,
        contest_id: &str,
        request: &PointsUpsertRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(&format!("/api/admin/contests/{contest_id}/player-points")))
            .json(request)
            .send()
            .await?;
        // The acknowledgement body is not trusted; callers re-fetch instead.
        Self::check(response).await?;
        Ok(())
    }

    async fn create_team(&self, payload: &TeamPayload) -> Result<TeamResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/api/teams"))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_team(
        &self,
        team_id: &str,
        payload: &TeamPayload,
    ) -> Result<TeamResponse, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/teams/{team_id}")))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn enroll_team(
        &self,
        contest_id: &str,
        team_id: &str,
    ) -> Result<EnrollmentResponse, ApiError> {
        let response = self
            .http
            .post(self.url(&format!("/api/contests/{contest_id}/enroll")))
            .json(&serde_json::json!({ "team_id": team_id }))
            .send()
            .await?;
        Self::decode(response).await
    }
}

// ---------------------------------------------------------------------------
// Error-detail extraction
// ---------------------------------------------------------------------------

/// Pull a human-readable message out of an error body.
///
/// The backend reports errors as `{"detail": ...}` where detail is a plain
/// string, a validation-error list of `{msg}` objects, or an arbitrary
/// object. Anything unrecognizable falls back to a generic status message.
fn extract_detail(status: StatusCode, body: &str) -> String {
    let fallback = || {
        format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("request failed")
        )
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .or_else(|| item.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect();
            if messages.is_empty() {
                fallback()
            } else {
                messages.join("; ")
            }
        }
        Some(other) if !other.is_null() => other.to_string(),
        _ => fallback(),
    }
}
