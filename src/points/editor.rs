// Per-contest points editing workflow for the admin dashboard.
//
// Saves are batched per team affiliation rather than roster-wide, so an
// administrator can review and push one team at a time. After a successful
// upsert the full per-contest list is re-fetched and merged back as server
// truth; the upsert acknowledgement body itself is never trusted.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::types::{Contest, PointsUpdate, PointsUpsertRequest};
use crate::api::{ApiError, ContestApi};
use crate::points::buffer::PointsBuffer;
use crate::roster::player::Player;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no contest selected")]
    NoContest,

    #[error("a save for this contest is already in flight")]
    SaveInFlight,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Points editor scoped to one selected contest.
pub struct PointsEditor<A> {
    api: Arc<A>,
    contests: Vec<Contest>,
    contest_id: Option<String>,
    buffer: PointsBuffer,
    saving: bool,
}

impl<A: ContestApi> PointsEditor<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            contests: Vec::new(),
            contest_id: None,
            buffer: PointsBuffer::new(),
            saving: false,
        }
    }

    pub fn buffer(&self) -> &PointsBuffer {
        &self.buffer
    }

    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    pub fn selected_contest(&self) -> Option<&Contest> {
        let id = self.contest_id.as_deref()?;
        self.contests.iter().find(|c| c.id == id)
    }

    /// Whether a per-team save is currently outstanding. The UI disables the
    /// save controls for the contest while this is set.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[cfg(test)]
    fn force_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    /// Load the contest list for the selector. Non-blocking: a failure
    /// leaves the list empty and the rest of the screen usable.
    pub async fn load_contests(&mut self) {
        match self.api.fetch_contests().await {
            Ok(contests) => self.contests = contests,
            Err(e) => {
                warn!("contest list unavailable: {e}");
                self.contests = Vec::new();
            }
        }
    }

    /// Select a contest and load its points into a fresh buffer.
    ///
    /// A fetch failure resets the buffer to empty rather than leaving stale
    /// values from the previous contest, and is non-fatal to the screen.
    pub async fn select_contest(&mut self, contest_id: &str) {
        self.contest_id = Some(contest_id.to_string());
        match self.api.fetch_player_points(contest_id).await {
            Ok(items) => self.buffer.replace_from_server(&items),
            Err(e) => {
                warn!(contest_id, "failed to load contest points: {e}");
                self.buffer.clear();
            }
        }
    }

    /// Whether `team` may be edited under the selected contest's
    /// allowed-teams restriction.
    pub fn admits_team(&self, team: &str) -> bool {
        self.selected_contest()
            .map(|c| c.admits_team(team))
            .unwrap_or(true)
    }

    /// The typing path: raw text in, no validation.
    pub fn edit(&mut self, player_id: &str, raw_text: &str) {
        self.buffer.edit(player_id, raw_text);
    }

    /// The blur path: snap the field to canonical form.
    pub fn commit_blur(&mut self, player_id: &str) -> f64 {
        self.buffer.commit(player_id)
    }

    /// Save the given team's points in one batched upsert, then re-fetch the
    /// contest's full points list and merge it back as server truth.
    ///
    /// On failure the buffer keeps the normalized values committed at the
    /// start of the save and no refresh happens; the caller surfaces the
    /// error and the user retries manually.
    pub async fn save_team(
        &mut self,
        team_name: &str,
        team_players: &[Player],
    ) -> Result<(), SaveError> {
        if self.saving {
            return Err(SaveError::SaveInFlight);
        }
        let contest_id = self.contest_id.clone().ok_or(SaveError::NoContest)?;

        self.saving = true;
        let result = self
            .save_team_inner(&contest_id, team_name, team_players)
            .await;
        self.saving = false;
        result
    }

    async fn save_team_inner(
        &mut self,
        contest_id: &str,
        team_name: &str,
        team_players: &[Player],
    ) -> Result<(), SaveError> {
        // Commit every field in the team so the batch carries normalized
        // values and the fields snap visibly, ahead of the server response.
        let updates: Vec<PointsUpdate> = team_players
            .iter()
            .map(|p| PointsUpdate {
                player_id: p.id.clone(),
                points: self.buffer.commit(&p.id),
            })
            .collect();

        let request = PointsUpsertRequest { updates };
        self.api.upsert_player_points(contest_id, &request).await?;

        let items = self.api.fetch_player_points(contest_id).await?;
        self.buffer.merge_from_server(&items);

        info!(
            contest_id,
            team = team_name,
            players = request.updates.len(),
            "team points saved"
        );
        Ok(())
    }
}
