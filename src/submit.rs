// Team submission: validation, payload packaging, create/update, and
// optional contest enrollment.

use thiserror::Error;

use crate::api::types::{EnrollmentResponse, TeamPayload, TeamResponse};
use crate::api::{ApiError, ContestApi};
use crate::roster::store::RosterSelectionStore;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("please enter a team name")]
    MissingName,

    #[error("please select a captain")]
    MissingCaptain,

    #[error("please select a vice-captain")]
    MissingViceCaptain,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a successful submission.
///
/// Enrollment is attempted only after a create with a contest id; its
/// failure does not undo the created team, so the outcome carries the
/// team together with the enrollment notice when one occurred.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub team: TeamResponse,
    pub enrollment: Option<EnrollmentResponse>,
    pub enrollment_error: Option<String>,
}

/// Package the current selection into a team payload.
///
/// Validation is synchronous and mutates nothing: a blank name or a missing
/// leader rejects before any request is built. Squad completeness is the
/// step-1 gate's job and is not re-checked here.
pub fn build_payload(
    store: &RosterSelectionStore,
    team_name: &str,
    contest_id: Option<&str>,
) -> Result<TeamPayload, SubmitError> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Err(SubmitError::MissingName);
    }
    let captain_id = store.captain().ok_or(SubmitError::MissingCaptain)?;
    let vice_captain_id = store.vice_captain().ok_or(SubmitError::MissingViceCaptain)?;

    Ok(TeamPayload {
        team_name: team_name.to_string(),
        player_ids: store.combined_selection(),
        captain_id: captain_id.to_string(),
        vice_captain_id: vice_captain_id.to_string(),
        contest_id: contest_id.map(str::to_string),
    })
}

/// Submit the selection as a new team, enrolling it in the contest when one
/// is given. All failures leave local state untouched so the user can fix
/// and re-submit.
pub async fn create_and_enroll<A: ContestApi>(
    api: &A,
    store: &RosterSelectionStore,
    team_name: &str,
    contest_id: Option<&str>,
) -> Result<SubmitOutcome, SubmitError> {
    let payload = build_payload(store, team_name, contest_id)?;
    let team = api.create_team(&payload).await?;

    let mut outcome = SubmitOutcome {
        team,
        enrollment: None,
        enrollment_error: None,
    };
    if let Some(contest_id) = contest_id {
        match api.enroll_team(contest_id, &outcome.team.id).await {
            Ok(enrollment) => outcome.enrollment = Some(enrollment),
            Err(e) => {
                outcome.enrollment_error = Some(
                    e.server_detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string()),
                );
            }
        }
    }
    Ok(outcome)
}

/// Update an existing team in place. No enrollment: editing a team does not
/// change which contests it is entered in.
pub async fn update_existing<A: ContestApi>(
    api: &A,
    store: &RosterSelectionStore,
    team_id: &str,
    team_name: &str,
    contest_id: Option<&str>,
) -> Result<SubmitOutcome, SubmitError> {
    let payload = build_payload(store, team_name, contest_id)?;
    let team = api.update_team(team_id, &payload).await?;
    Ok(SubmitOutcome {
        team,
        enrollment: None,
        enrollment_error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionRules;
    use crate::roster::player::{Gender, Player};

    fn player(id: &str, team: &str, gender: Gender) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            team: team.to_string(),
            gender,
            role: "Men".to_string(),
            points: 0.0,
            price: 0.0,
            image_url: None,
            is_hot: false,
        }
    }

    fn full_store() -> RosterSelectionStore {
        let mut store = RosterSelectionStore::new(SelectionRules::default());
        for i in 0..12 {
            store.toggle(&player(&format!("m{i}"), &format!("T{}", i / 3), Gender::Male));
        }
        for i in 0..4 {
            store.toggle(&player(&format!("w{i}"), &format!("T{i}"), Gender::Female));
        }
        store.set_captain("m0");
        store.set_vice_captain("w0");
        store
    }

    #[test]
    fn payload_carries_ordered_ids_and_leaders() {
        let store = full_store();
        let payload = build_payload(&store, "Strikers", Some("c1")).unwrap();
        assert_eq!(payload.team_name, "Strikers");
        assert_eq!(payload.player_ids.len(), 16);
        assert_eq!(payload.player_ids[0], "m0");
        assert_eq!(payload.player_ids[12], "w0");
        assert_eq!(payload.captain_id, "m0");
        assert_eq!(payload.vice_captain_id, "w0");
        assert_eq!(payload.contest_id.as_deref(), Some("c1"));
    }

    #[test]
    fn blank_name_rejected() {
        let store = full_store();
        assert!(matches!(
            build_payload(&store, "   ", None),
            Err(SubmitError::MissingName)
        ));
    }

    #[test]
    fn name_is_trimmed() {
        let store = full_store();
        let payload = build_payload(&store, "  Strikers  ", None).unwrap();
        assert_eq!(payload.team_name, "Strikers");
    }

    #[test]
    fn missing_captain_rejected_before_vice() {
        let mut store = full_store();
        store.set_captain("w0"); // displaces the vice-captain
        assert!(matches!(
            build_payload(&store, "Strikers", None),
            Err(SubmitError::MissingViceCaptain)
        ));

        let mut store = RosterSelectionStore::new(SelectionRules::default());
        store.set_vice_captain("w0");
        assert!(matches!(
            build_payload(&store, "Strikers", None),
            Err(SubmitError::MissingCaptain)
        ));
    }
}
