// Integration tests for the squad builder.
//
// These tests exercise the full system end-to-end using the library crate's
// public API. They verify that the major subsystems (roster pool loading,
// the selection state machine, team submission with enrollment, the points
// reconciliation workflow, session persistence, and CSV import) work
// together correctly over an in-memory backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use squad_builder::api::types::{
    ApiPlayer, ApiSlot, Contest, EnrollmentResponse, HotPlayerIds, PlayerPointsItem,
    PointsUpdate, PointsUpsertRequest, TeamPayload, TeamResponse,
};
use squad_builder::api::{ApiError, ContestApi};
use squad_builder::config::SelectionRules;
use squad_builder::db::SessionDb;
use squad_builder::import;
use squad_builder::points::PointsEditor;
use squad_builder::roster::{load_roster, BuildStep, Gender, LoadError, ToggleOutcome};
use squad_builder::session::BuilderSession;

// ===========================================================================
// Mock backend
// ===========================================================================

const MEN_SLOT_ID: &str = "slot-men";
const WOMEN_SLOT_ID: &str = "slot-women";

/// In-memory backend recording every write it receives.
struct MockBackend {
    slots: Vec<ApiSlot>,
    men: Vec<ApiPlayer>,
    women: Vec<ApiPlayer>,
    hot_ids: Option<Vec<String>>,
    contests: Vec<Contest>,
    points: Mutex<Vec<PlayerPointsItem>>,
    upserts: Mutex<Vec<(String, PointsUpsertRequest)>>,
    created_teams: Mutex<Vec<TeamPayload>>,
    updated_teams: Mutex<Vec<(String, TeamPayload)>>,
    enrollments: Mutex<Vec<(String, String)>>,
    fail_players: bool,
    fail_enroll: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            slots: vec![
                slot(MEN_SLOT_ID, "MEN", "Men"),
                slot(WOMEN_SLOT_ID, "WOMEN", "Women"),
            ],
            men: standard_men(),
            women: standard_women(),
            hot_ids: Some(vec!["m0".to_string(), "w0".to_string()]),
            contests: Vec::new(),
            points: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            created_teams: Mutex::new(Vec::new()),
            updated_teams: Mutex::new(Vec::new()),
            enrollments: Mutex::new(Vec::new()),
            fail_players: false,
            fail_enroll: false,
        }
    }
}

#[async_trait]
impl ContestApi for MockBackend {
    async fn fetch_slots(&self) -> Result<Vec<ApiSlot>, ApiError> {
        Ok(self.slots.clone())
    }

    async fn fetch_players_by_slot(
        &self,
        slot_id: &str,
        _contest_id: Option<&str>,
        _gender: Option<&str>,
    ) -> Result<Vec<ApiPlayer>, ApiError> {
        if self.fail_players {
            return Err(status_error(500, "players unavailable"));
        }
        match slot_id {
            MEN_SLOT_ID => Ok(self.men.clone()),
            WOMEN_SLOT_ID => Ok(self.women.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_hot_player_ids(
        &self,
        _contest_id: Option<&str>,
    ) -> Result<HotPlayerIds, ApiError> {
        match &self.hot_ids {
            Some(ids) => Ok(HotPlayerIds {
                player_ids: ids.clone(),
                threshold: Some(10),
            }),
            None => Err(status_error(503, "hot ids offline")),
        }
    }

    async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError> {
        Ok(self.contests.clone())
    }

    async fn fetch_player_points(
        &self,
        _contest_id: &str,
    ) -> Result<Vec<PlayerPointsItem>, ApiError> {
        Ok(self.points.lock().unwrap().clone())
    }

    async fn upsert_player_points(
        &self,
        contest_id: &str,
        request: &PointsUpsertRequest,
    ) -> Result<(), ApiError> {
        self.upserts
            .lock()
            .unwrap()
            .push((contest_id.to_string(), request.clone()));
        // Apply the batch so the follow-up fetch sees the new values.
        let mut points = self.points.lock().unwrap();
        for update in &request.updates {
            match points.iter_mut().find(|i| i.player_id == update.player_id) {
                Some(item) => item.points = Some(update.points),
                None => points.push(PlayerPointsItem {
                    player_id: update.player_id.clone(),
                    points: Some(update.points),
                }),
            }
        }
        Ok(())
    }

    async fn create_team(&self, payload: &TeamPayload) -> Result<TeamResponse, ApiError> {
        self.created_teams.lock().unwrap().push(payload.clone());
        Ok(team_response("team-1", payload))
    }

    async fn update_team(
        &self,
        team_id: &str,
        payload: &TeamPayload,
    ) -> Result<TeamResponse, ApiError> {
        self.updated_teams
            .lock()
            .unwrap()
            .push((team_id.to_string(), payload.clone()));
        Ok(team_response(team_id, payload))
    }

    async fn enroll_team(
        &self,
        contest_id: &str,
        team_id: &str,
    ) -> Result<EnrollmentResponse, ApiError> {
        if self.fail_enroll {
            return Err(status_error(409, "Contest is full"));
        }
        self.enrollments
            .lock()
            .unwrap()
            .push((contest_id.to_string(), team_id.to_string()));
        Ok(EnrollmentResponse {
            id: "enr-1".to_string(),
            contest_id: contest_id.to_string(),
            team_id: team_id.to_string(),
        })
    }
}

// ===========================================================================
// Fixtures
// ===========================================================================

fn slot(id: &str, code: &str, name: &str) -> ApiSlot {
    ApiSlot {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn api_player(id: &str, team: &str, gender: &str) -> ApiPlayer {
    ApiPlayer {
        id: id.to_string(),
        name: format!("Player {id}"),
        team: Some(team.to_string()),
        slot: None,
        price: Some(8.0),
        points: Some(10.0),
        image_url: None,
        gender: Some(gender.to_string()),
    }
}

/// 15 men across 5 teams -- enough to fill the quota within the cap.
fn standard_men() -> Vec<ApiPlayer> {
    (0..15)
        .map(|i| api_player(&format!("m{i}"), &format!("Team {}", i / 3), "male"))
        .collect()
}

/// 5 women, one per team.
fn standard_women() -> Vec<ApiPlayer> {
    (0..5)
        .map(|i| api_player(&format!("w{i}"), &format!("Team {i}"), "female"))
        .collect()
}

fn team_response(id: &str, payload: &TeamPayload) -> TeamResponse {
    TeamResponse {
        id: id.to_string(),
        team_name: payload.team_name.clone(),
        player_ids: payload.player_ids.clone(),
        captain_id: payload.captain_id.clone(),
        vice_captain_id: payload.vice_captain_id.clone(),
    }
}

fn status_error(status: u16, detail: &str) -> ApiError {
    ApiError::Status {
        status,
        detail: detail.to_string(),
    }
}

fn points_item(player_id: &str, points: f64) -> PlayerPointsItem {
    PlayerPointsItem {
        player_id: player_id.to_string(),
        points: Some(points),
    }
}

async fn loaded_session(backend: Arc<MockBackend>) -> BuilderSession<MockBackend> {
    BuilderSession::load(backend, SelectionRules::default(), Some("contest-1"))
        .await
        .expect("session should load")
}

/// Drive a session to a complete, submit-ready selection.
fn fill_squad(session: &mut BuilderSession<MockBackend>) {
    for i in 0..12 {
        assert_eq!(
            session.toggle(&format!("m{i}")),
            Some(ToggleOutcome::Added)
        );
    }
    for i in 0..4 {
        assert_eq!(
            session.toggle(&format!("w{i}")),
            Some(ToggleOutcome::Added)
        );
    }
    assert!(session.advance_to(BuildStep::Leaders));
    session.set_captain("m0");
    session.set_vice_captain("w0");
    assert!(session.advance_to(BuildStep::Review));
}

// ===========================================================================
// Roster loading
// ===========================================================================

#[tokio::test]
async fn load_builds_pool_with_hot_flags() {
    let backend = Arc::new(MockBackend::default());
    let pool = load_roster(backend.as_ref(), Some("contest-1"))
        .await
        .unwrap();

    assert_eq!(pool.of_gender(Gender::Male).count(), 15);
    assert_eq!(pool.of_gender(Gender::Female).count(), 5);
    assert!(pool.player("m0").unwrap().is_hot);
    assert!(pool.player("w0").unwrap().is_hot);
    assert!(!pool.player("m1").unwrap().is_hot);
    assert_eq!(pool.player("m0").unwrap().role, "Men");
}

#[tokio::test]
async fn missing_women_slot_is_fatal() {
    let backend = Arc::new(MockBackend {
        slots: vec![slot(MEN_SLOT_ID, "MEN", "Men")],
        ..Default::default()
    });
    let err = load_roster(backend.as_ref(), None).await.unwrap_err();
    match err {
        LoadError::MissingSlot { code } => assert_eq!(code, "WOMEN"),
        other => panic!("expected MissingSlot, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_gender_tag_is_fatal() {
    let mut men = standard_men();
    men[3].gender = None;
    let backend = Arc::new(MockBackend {
        men,
        ..Default::default()
    });
    let err = load_roster(backend.as_ref(), None).await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidGender { .. }));
}

#[tokio::test]
async fn primary_player_fetch_failure_is_fatal() {
    let backend = Arc::new(MockBackend {
        fail_players: true,
        ..Default::default()
    });
    let err = load_roster(backend.as_ref(), None).await.unwrap_err();
    assert!(matches!(err, LoadError::Api(_)));
}

#[tokio::test]
async fn hot_ids_failure_is_absorbed() {
    let backend = Arc::new(MockBackend {
        hot_ids: None,
        ..Default::default()
    });
    let pool = load_roster(backend.as_ref(), None).await.unwrap();
    assert!(pool.players.iter().all(|p| !p.is_hot));
}

// ===========================================================================
// Selection flow
// ===========================================================================

#[tokio::test]
async fn full_builder_flow_submits_ordered_team() {
    let backend = Arc::new(MockBackend::default());
    let mut session = loaded_session(Arc::clone(&backend)).await;
    fill_squad(&mut session);

    let outcome = session.submit("Dream XI").await.unwrap();
    assert_eq!(outcome.team.id, "team-1");
    assert!(outcome.enrollment.is_some());
    assert!(outcome.enrollment_error.is_none());

    let created = backend.created_teams.lock().unwrap();
    assert_eq!(created.len(), 1);
    let payload = &created[0];
    assert_eq!(payload.team_name, "Dream XI");
    assert_eq!(payload.player_ids.len(), 16);
    // Men first in selection order, then women.
    assert_eq!(payload.player_ids[0], "m0");
    assert_eq!(payload.player_ids[11], "m11");
    assert_eq!(payload.player_ids[12], "w0");
    assert_eq!(payload.player_ids[15], "w3");
    assert_eq!(payload.captain_id, "m0");
    assert_eq!(payload.vice_captain_id, "w0");
    assert_eq!(payload.contest_id.as_deref(), Some("contest-1"));

    let enrollments = backend.enrollments.lock().unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(
        enrollments[0],
        ("contest-1".to_string(), "team-1".to_string())
    );
}

#[tokio::test]
async fn quota_and_cap_hold_through_the_session() {
    let mut men = standard_men();
    men.push(api_player("m15", "Team 0", "male"));
    let backend = Arc::new(MockBackend {
        men,
        ..Default::default()
    });
    let mut session = loaded_session(backend).await;

    // Team 0 holds m0..m2: a fourth from the same team is capped, while a
    // player from another team is still accepted.
    for i in 0..3 {
        assert_eq!(
            session.toggle(&format!("m{i}")),
            Some(ToggleOutcome::Added)
        );
    }
    assert!(session.store().selection_blocked(Gender::Male, "Team 0"));
    assert_eq!(session.toggle("m15"), Some(ToggleOutcome::TeamCapped));
    assert!(!session.store().is_selected("m15"));
    assert_eq!(session.toggle("m3"), Some(ToggleOutcome::Added));

    // Fill to the quota and check the 13th man bounces.
    for i in 4..12 {
        assert_eq!(
            session.toggle(&format!("m{i}")),
            Some(ToggleOutcome::Added)
        );
    }
    assert_eq!(session.toggle("m12"), Some(ToggleOutcome::AtQuota));
    assert_eq!(session.store().selected(Gender::Male).len(), 12);
    assert!(!session.store().is_selected("m12"));
}

#[tokio::test]
async fn enrollment_failure_keeps_created_team() {
    let backend = Arc::new(MockBackend {
        fail_enroll: true,
        ..Default::default()
    });
    let mut session = loaded_session(Arc::clone(&backend)).await;
    fill_squad(&mut session);

    let outcome = session.submit("Dream XI").await.unwrap();
    assert_eq!(outcome.team.id, "team-1");
    assert!(outcome.enrollment.is_none());
    assert_eq!(outcome.enrollment_error.as_deref(), Some("Contest is full"));
    assert_eq!(backend.created_teams.lock().unwrap().len(), 1);
    assert!(backend.enrollments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_mode_puts_to_existing_team() {
    let backend = Arc::new(MockBackend::default());
    let mut session = loaded_session(Arc::clone(&backend)).await;
    fill_squad(&mut session);

    let outcome = session.submit_update("team-9", "Renamed XI").await.unwrap();
    assert_eq!(outcome.team.id, "team-9");
    assert!(outcome.enrollment.is_none());

    let updated = backend.updated_teams.lock().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "team-9");
    assert_eq!(updated[0].1.team_name, "Renamed XI");
    assert!(backend.created_teams.lock().unwrap().is_empty());
}

#[tokio::test]
async fn clear_all_resets_the_wizard() {
    let backend = Arc::new(MockBackend::default());
    let mut session = loaded_session(backend).await;
    fill_squad(&mut session);

    session.clear_all();
    assert!(session.store().selected(Gender::Male).is_empty());
    assert!(session.store().selected(Gender::Female).is_empty());
    assert_eq!(session.store().captain(), None);
    assert_eq!(session.store().vice_captain(), None);
    assert_eq!(session.store().step(), BuildStep::PickSquad);
    assert_eq!(session.store().active_gender(), Gender::Male);
}

// ===========================================================================
// Session persistence
// ===========================================================================

#[tokio::test]
async fn selection_survives_a_restart() {
    let backend = Arc::new(MockBackend::default());
    let db = SessionDb::open(":memory:").unwrap();

    let mut session = loaded_session(Arc::clone(&backend)).await;
    fill_squad(&mut session);
    session.save_to(&db).unwrap();
    drop(session);

    let mut restored = loaded_session(backend).await;
    assert!(restored.restore_from(&db).unwrap());
    assert_eq!(restored.store().selected(Gender::Male).len(), 12);
    assert_eq!(restored.store().captain(), Some("m0"));
    assert_eq!(restored.store().vice_captain(), Some("w0"));
    assert_eq!(restored.store().step(), BuildStep::Review);
}

// ===========================================================================
// Points reconciliation
// ===========================================================================

fn alpha_contest() -> Contest {
    Contest {
        id: "contest-1".to_string(),
        name: "Weekend League".to_string(),
        status: "Live".to_string(),
        contest_type: "season".to_string(),
        start_at: Utc::now(),
        end_at: Utc::now(),
        allowed_teams: None,
    }
}

#[tokio::test]
async fn save_team_round_trip() {
    let backend = Arc::new(MockBackend {
        contests: vec![alpha_contest()],
        points: Mutex::new(vec![
            points_item("m0", 1.0),
            points_item("m1", 2.0),
            points_item("m3", 3.0),
        ]),
        ..Default::default()
    });
    let pool = load_roster(backend.as_ref(), Some("contest-1"))
        .await
        .unwrap();

    let mut editor = PointsEditor::new(Arc::clone(&backend));
    editor.load_contests().await;
    editor.select_contest("contest-1").await;
    assert_eq!(editor.buffer().display_text("m0"), "1.000");

    // Edit two Team 0 players; leave a Team 1 edit hanging mid-type.
    editor.edit("m0", "12.3456");
    editor.edit("m1", "abc");
    editor.edit("m3", "7.7");

    let team0: Vec<_> = pool
        .of_gender(Gender::Male)
        .filter(|p| p.team == "Team 0")
        .cloned()
        .collect();
    assert_eq!(team0.len(), 3);
    editor.save_team("Team 0", &team0).await.unwrap();

    // Exactly one upsert, covering exactly Team 0's players.
    let upserts = backend.upserts.lock().unwrap();
    assert_eq!(upserts.len(), 1);
    let (contest_id, request) = &upserts[0];
    assert_eq!(contest_id, "contest-1");
    assert_eq!(
        request.updates,
        vec![
            PointsUpdate {
                player_id: "m0".to_string(),
                points: 12.346
            },
            PointsUpdate {
                player_id: "m1".to_string(),
                points: 0.0
            },
            PointsUpdate {
                player_id: "m2".to_string(),
                points: 0.0
            },
        ]
    );
    drop(upserts);

    // The refresh reasserted server truth for the saved team...
    assert_eq!(editor.buffer().display_text("m0"), "12.346");
    assert_eq!(editor.buffer().server_value("m1"), Some(0.0));
    // ...and preserved the unrelated in-flight edit.
    assert_eq!(editor.buffer().display_text("m3"), "7.7");
    assert!(editor.buffer().is_dirty("m3"));
}

#[tokio::test]
async fn blur_snaps_to_canonical_form() {
    let backend = Arc::new(MockBackend {
        points: Mutex::new(vec![points_item("m0", 5.0)]),
        ..Default::default()
    });
    let mut editor = PointsEditor::new(backend);
    editor.select_contest("contest-1").await;

    editor.edit("m0", "abc");
    assert_eq!(editor.buffer().display_text("m0"), "abc");
    let committed = editor.commit_blur("m0");
    assert_eq!(committed, 0.0);
    assert_eq!(editor.buffer().display_text("m0"), "0.000");
}

// ===========================================================================
// CSV import
// ===========================================================================

#[test]
fn import_fixture_round_trip() {
    let file = std::fs::File::open("tests/fixtures/players_import.csv").unwrap();
    let report = import::parse_players(file).unwrap();

    assert_eq!(report.players.len(), 4);
    assert_eq!(report.errors.len(), 2);

    let names: Vec<&str> = report.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Asha Rao", "Dev Nair", "Kiran Pillai", "Meera Iyer"]);
    assert_eq!(report.players[0].gender, Gender::Female);
    assert_eq!(report.players[1].status, "Injured");

    // Row 4 has no name; row 6 has non-numeric points.
    assert_eq!(report.errors[0].row, 4);
    assert_eq!(report.errors[0].field, "name");
    assert_eq!(report.errors[1].row, 6);
    assert_eq!(report.errors[1].field, "points");
}
