// Builder session orchestration.
//
// Ties one loaded roster pool to one selection store and the submission
// workflow. UI events arrive as method calls; every mutation of the
// selection goes through the store so the construction invariants hold no
// matter what sequence of events fires.

use std::sync::Arc;

use tracing::debug;

use crate::api::ContestApi;
use crate::config::SelectionRules;
use crate::db::SessionDb;
use crate::roster::load::{load_roster, LoadError, RosterPool};
use crate::roster::player::{Gender, TeamGroup};
use crate::roster::store::{BuildStep, RosterSelectionStore, SelectionSnapshot, ToggleOutcome};
use crate::submit::{self, SubmitError, SubmitOutcome};

pub struct BuilderSession<A> {
    api: Arc<A>,
    contest_id: Option<String>,
    pool: RosterPool,
    store: RosterSelectionStore,
}

impl<A: ContestApi> BuilderSession<A> {
    /// Fetch the roster pool and start a fresh session over it.
    pub async fn load(
        api: Arc<A>,
        rules: SelectionRules,
        contest_id: Option<&str>,
    ) -> Result<Self, LoadError> {
        let pool = load_roster(api.as_ref(), contest_id).await?;
        Ok(Self::new(api, pool, rules, contest_id))
    }

    pub fn new(
        api: Arc<A>,
        pool: RosterPool,
        rules: SelectionRules,
        contest_id: Option<&str>,
    ) -> Self {
        Self {
            api,
            contest_id: contest_id.map(str::to_string),
            pool,
            store: RosterSelectionStore::new(rules),
        }
    }

    pub fn pool(&self) -> &RosterPool {
        &self.pool
    }

    pub fn store(&self) -> &RosterSelectionStore {
        &self.store
    }

    pub fn contest_id(&self) -> Option<&str> {
        self.contest_id.as_deref()
    }

    // -- selection events ---------------------------------------------------

    /// Toggle a player by id. Unknown ids are ignored (`None`): the pool is
    /// immutable for the session, so an unknown id can only come from a
    /// stale snapshot or a UI bug.
    pub fn toggle(&mut self, player_id: &str) -> Option<ToggleOutcome> {
        let Some(player) = self.pool.player(player_id) else {
            debug!(player_id, "toggle for unknown player ignored");
            return None;
        };
        let player = player.clone();
        Some(self.store.toggle(&player))
    }

    /// Assign the captain. Only selected players are eligible; the UI only
    /// offers the action for them, so anything else is ignored.
    pub fn set_captain(&mut self, player_id: &str) {
        if self.store.is_selected(player_id) {
            self.store.set_captain(player_id);
        }
    }

    pub fn set_vice_captain(&mut self, player_id: &str) {
        if self.store.is_selected(player_id) {
            self.store.set_vice_captain(player_id);
        }
    }

    pub fn set_active_gender(&mut self, gender: Gender) {
        self.store.set_active_gender(gender);
    }

    /// Move the wizard cursor. Backward movement is unrestricted; forward
    /// movement is gated on the squad and leader requirements.
    pub fn advance_to(&mut self, target: BuildStep) -> bool {
        if target <= self.store.step() {
            self.store.set_step(target);
            return true;
        }
        let allowed = match target {
            BuildStep::PickSquad => true,
            BuildStep::Leaders => self.store.can_proceed_to_leaders(),
            BuildStep::Review => {
                self.store.can_proceed_to_leaders() && self.store.can_proceed_to_review()
            }
        };
        if allowed {
            self.store.set_step(target);
        }
        allowed
    }

    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// The active gender's pool grouped by team in first-appearance order.
    pub fn grouped_active(&self) -> Vec<TeamGroup<'_>> {
        crate::roster::player::group_by_team(&self.pool.players, self.store.active_gender())
    }

    // -- submission ---------------------------------------------------------

    pub async fn submit(&self, team_name: &str) -> Result<SubmitOutcome, SubmitError> {
        submit::create_and_enroll(
            self.api.as_ref(),
            &self.store,
            team_name,
            self.contest_id.as_deref(),
        )
        .await
    }

    pub async fn submit_update(
        &self,
        team_id: &str,
        team_name: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        submit::update_existing(
            self.api.as_ref(),
            &self.store,
            team_id,
            team_name,
            self.contest_id.as_deref(),
        )
        .await
    }

    // -- local persistence --------------------------------------------------

    pub fn save_to(&self, db: &SessionDb) -> anyhow::Result<()> {
        db.save_session(self.contest_id.as_deref(), &self.store.snapshot())
    }

    /// Restore a snapshot saved by a previous run by replaying it through
    /// the store. Ids missing from the current pool are dropped, leaders are
    /// kept only while still selected, and the step is re-gated, so a
    /// restored session can never violate the construction invariants even
    /// when the pool changed in the meantime.
    pub fn restore(&mut self, snapshot: &SelectionSnapshot) {
        self.store.clear_all();
        for id in snapshot.men.iter().chain(snapshot.women.iter()) {
            self.toggle(id);
        }
        if let Some(captain) = &snapshot.captain {
            self.set_captain(captain);
        }
        if let Some(vice) = &snapshot.vice_captain {
            self.set_vice_captain(vice);
        }
        if let Some(step) = BuildStep::from_number(snapshot.step) {
            self.advance_to(step);
        }
    }

    pub fn restore_from(&mut self, db: &SessionDb) -> anyhow::Result<bool> {
        match db.load_session(self.contest_id.as_deref())? {
            Some(snapshot) => {
                self.restore(&snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
