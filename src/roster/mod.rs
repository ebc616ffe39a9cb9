// Roster selection engine: player pool loading and the selection state
// machine that enforces gender quotas, per-team caps, captain/vice-captain
// exclusivity, and the build-step gates.

pub mod load;
pub mod player;
pub mod store;

pub use load::{load_roster, LoadError, RosterPool};
pub use player::{group_by_team, Gender, Player, TeamGroup, UNASSIGNED_TEAM};
pub use store::{BuildStep, RosterSelectionStore, SelectionSnapshot, ToggleOutcome};
