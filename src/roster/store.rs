// Selection state machine for the team builder.
//
// All mutation of the selection goes through this store. The surrounding
// workflow decides what to expose to the user; the store guarantees the
// invariants: no duplicates, gender quotas, per-team caps, and captain /
// vice-captain exclusivity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SelectionRules;
use crate::roster::player::{Gender, Player};

/// The builder wizard position.
///
/// Forward progress is gated by the derived booleans below; the setter
/// itself performs no validation and backward navigation is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildStep {
    PickSquad,
    Leaders,
    Review,
}

impl BuildStep {
    pub fn number(self) -> u8 {
        match self {
            BuildStep::PickSquad => 1,
            BuildStep::Leaders => 2,
            BuildStep::Review => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(BuildStep::PickSquad),
            2 => Some(BuildStep::Leaders),
            3 => Some(BuildStep::Review),
            _ => None,
        }
    }
}

/// What a toggle did. Rejections leave the state untouched; the UI disables
/// the control ahead of time using the same derived counts, so a rejection
/// is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    AtQuota,
    TeamCapped,
}

/// Serializable image of the selection, for local session persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub men: Vec<String>,
    pub women: Vec<String>,
    pub captain: Option<String>,
    pub vice_captain: Option<String>,
    pub step: u8,
}

/// Owns the selection collections, leader assignment, step cursor, and the
/// derived per-team counts for both genders.
#[derive(Debug, Clone)]
pub struct RosterSelectionStore {
    rules: SelectionRules,
    selected_men: Vec<String>,
    selected_women: Vec<String>,
    captain: Option<String>,
    vice_captain: Option<String>,
    step: BuildStep,
    active_gender: Gender,
    men_team_counts: HashMap<String, usize>,
    women_team_counts: HashMap<String, usize>,
}

impl RosterSelectionStore {
    pub fn new(rules: SelectionRules) -> Self {
        Self {
            rules,
            selected_men: Vec::new(),
            selected_women: Vec::new(),
            captain: None,
            vice_captain: None,
            step: BuildStep::PickSquad,
            active_gender: Gender::Male,
            men_team_counts: HashMap::new(),
            women_team_counts: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }

    // -- selection ----------------------------------------------------------

    /// Select or deselect a player.
    ///
    /// Deselection is always permitted. Selection appends to the tail of the
    /// player's gender collection (selection order is display order
    /// downstream) unless the gender quota or the per-team cap for that
    /// gender would be exceeded, in which case nothing changes.
    pub fn toggle(&mut self, player: &Player) -> ToggleOutcome {
        let quota = self.quota(player.gender);
        let cap = self.rules.max_per_team;

        if let Some(pos) = self
            .selected(player.gender)
            .iter()
            .position(|id| id == &player.id)
        {
            self.selected_mut(player.gender).remove(pos);
            self.decrement_team(player.gender, &player.team);
            return ToggleOutcome::Removed;
        }

        if self.selected(player.gender).len() >= quota {
            return ToggleOutcome::AtQuota;
        }
        if self.team_count(player.gender, &player.team) >= cap {
            return ToggleOutcome::TeamCapped;
        }

        self.selected_mut(player.gender).push(player.id.clone());
        self.increment_team(player.gender, &player.team);
        ToggleOutcome::Added
    }

    pub fn selected(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.selected_men,
            Gender::Female => &self.selected_women,
        }
    }

    pub fn is_selected(&self, player_id: &str) -> bool {
        self.selected_men.iter().any(|id| id == player_id)
            || self.selected_women.iter().any(|id| id == player_id)
    }

    /// Combined selection: men first, then women, each in selection order.
    pub fn combined_selection(&self) -> Vec<String> {
        let mut all = Vec::with_capacity(self.selected_men.len() + self.selected_women.len());
        all.extend(self.selected_men.iter().cloned());
        all.extend(self.selected_women.iter().cloned());
        all
    }

    pub fn quota(&self, gender: Gender) -> usize {
        match gender {
            Gender::Male => self.rules.men_quota,
            Gender::Female => self.rules.women_quota,
        }
    }

    // -- per-team counts ----------------------------------------------------

    /// Selected players of `gender` from `team`.
    pub fn team_count(&self, gender: Gender, team: &str) -> usize {
        self.team_counts(gender).get(team).copied().unwrap_or(0)
    }

    pub fn team_counts(&self, gender: Gender) -> &HashMap<String, usize> {
        match gender {
            Gender::Male => &self.men_team_counts,
            Gender::Female => &self.women_team_counts,
        }
    }

    /// Whether selecting another player from `team` in `gender` would be
    /// rejected. Mirrors the checks in `toggle` so the UI can disable
    /// controls ahead of time.
    pub fn selection_blocked(&self, gender: Gender, team: &str) -> bool {
        self.selected(gender).len() >= self.quota(gender)
            || self.team_count(gender, team) >= self.rules.max_per_team
    }

    // -- leaders ------------------------------------------------------------

    /// Assign the captain. If the player currently holds vice-captain, the
    /// vice-captain slot is cleared first so the two never coincide.
    pub fn set_captain(&mut self, player_id: &str) {
        if self.vice_captain.as_deref() == Some(player_id) {
            self.vice_captain = None;
        }
        self.captain = Some(player_id.to_string());
    }

    /// Assign the vice-captain, clearing the captain when they coincide.
    pub fn set_vice_captain(&mut self, player_id: &str) {
        if self.captain.as_deref() == Some(player_id) {
            self.captain = None;
        }
        self.vice_captain = Some(player_id.to_string());
    }

    pub fn captain(&self) -> Option<&str> {
        self.captain.as_deref()
    }

    pub fn vice_captain(&self) -> Option<&str> {
        self.vice_captain.as_deref()
    }

    // -- wizard cursor ------------------------------------------------------

    pub fn step(&self) -> BuildStep {
        self.step
    }

    /// Move the wizard cursor. Callers gate forward movement on
    /// `can_proceed_to_leaders` / `can_proceed_to_review`; backward movement
    /// is always fine.
    pub fn set_step(&mut self, step: BuildStep) {
        self.step = step;
    }

    pub fn active_gender(&self) -> Gender {
        self.active_gender
    }

    pub fn set_active_gender(&mut self, gender: Gender) {
        self.active_gender = gender;
    }

    /// Step 1 -> 2 gate: both collections exactly at quota.
    pub fn can_proceed_to_leaders(&self) -> bool {
        self.selected_men.len() == self.rules.men_quota
            && self.selected_women.len() == self.rules.women_quota
    }

    /// Step 2 -> 3 gate: both leaders assigned.
    pub fn can_proceed_to_review(&self) -> bool {
        self.captain.is_some() && self.vice_captain.is_some()
    }

    // -- reset & persistence ------------------------------------------------

    /// Full reset: collections emptied, leaders cleared, step back to 1,
    /// active gender back to men.
    pub fn clear_all(&mut self) {
        self.selected_men.clear();
        self.selected_women.clear();
        self.captain = None;
        self.vice_captain = None;
        self.step = BuildStep::PickSquad;
        self.active_gender = Gender::Male;
        self.men_team_counts.clear();
        self.women_team_counts.clear();
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            men: self.selected_men.clone(),
            women: self.selected_women.clone(),
            captain: self.captain.clone(),
            vice_captain: self.vice_captain.clone(),
            step: self.step.number(),
        }
    }

    // -- internals ----------------------------------------------------------

    fn selected_mut(&mut self, gender: Gender) -> &mut Vec<String> {
        match gender {
            Gender::Male => &mut self.selected_men,
            Gender::Female => &mut self.selected_women,
        }
    }

    fn increment_team(&mut self, gender: Gender, team: &str) {
        *self.team_counts_mut(gender).entry(team.to_string()).or_insert(0) += 1;
    }

    fn decrement_team(&mut self, gender: Gender, team: &str) {
        let counts = self.team_counts_mut(gender);
        if let Some(count) = counts.get_mut(team) {
            *count -= 1;
            if *count == 0 {
                counts.remove(team);
            }
        }
    }

    fn team_counts_mut(&mut self, gender: Gender) -> &mut HashMap<String, usize> {
        match gender {
            Gender::Male => &mut self.men_team_counts,
            Gender::Female => &mut self.women_team_counts,
        }
    }
}
