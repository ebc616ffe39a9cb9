// SQLite persistence for in-progress builder sessions.
//
// Only the local selection snapshot lives here, so a crash or restart does
// not lose a half-built squad. All authoritative data (players, teams,
// contests, points) is owned by the backend.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::roster::store::SelectionSnapshot;

pub struct SessionDb {
    conn: Mutex<Connection>,
}

impl SessionDb {
    /// Open (or create) the session database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral database (useful for
    /// tests).
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS builder_sessions (
                contest_id   TEXT PRIMARY KEY,
                men_ids      TEXT NOT NULL,
                women_ids    TEXT NOT NULL,
                captain      TEXT,
                vice_captain TEXT,
                step         INTEGER NOT NULL,
                updated_at   TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Poisoning only happens if another thread panicked mid-query;
        // propagating the panic is the right response.
        self.conn.lock().expect("session db mutex poisoned")
    }

    /// Persist the selection snapshot for a contest (empty string for the
    /// contest-less builder). Overwrites any previous snapshot.
    pub fn save_session(&self, contest_id: Option<&str>, snapshot: &SelectionSnapshot) -> Result<()> {
        let men = serde_json::to_string(&snapshot.men).context("failed to encode men ids")?;
        let women =
            serde_json::to_string(&snapshot.women).context("failed to encode women ids")?;
        let now = chrono::Utc::now().to_rfc3339();

        self.lock()
            .execute(
                "INSERT INTO builder_sessions
                     (contest_id, men_ids, women_ids, captain, vice_captain, step, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(contest_id) DO UPDATE SET
                     men_ids = excluded.men_ids,
                     women_ids = excluded.women_ids,
                     captain = excluded.captain,
                     vice_captain = excluded.vice_captain,
                     step = excluded.step,
                     updated_at = excluded.updated_at",
                params![
                    contest_id.unwrap_or(""),
                    men,
                    women,
                    snapshot.captain,
                    snapshot.vice_captain,
                    snapshot.step,
                    now,
                ],
            )
            .context("failed to save builder session")?;
        Ok(())
    }

    /// Load the stored snapshot for a contest, if any.
    pub fn load_session(&self, contest_id: Option<&str>) -> Result<Option<SelectionSnapshot>> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT men_ids, women_ids, captain, vice_captain, step
                 FROM builder_sessions WHERE contest_id = ?1",
                params![contest_id.unwrap_or("")],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, u8>(4)?,
                    ))
                },
            )
            .optional()
            .context("failed to load builder session")?;

        let Some((men, women, captain, vice_captain, step)) = row else {
            return Ok(None);
        };

        Ok(Some(SelectionSnapshot {
            men: serde_json::from_str(&men).context("corrupt men ids in session row")?,
            women: serde_json::from_str(&women).context("corrupt women ids in session row")?,
            captain,
            vice_captain,
            step,
        }))
    }

    /// Drop the stored snapshot for a contest (after a successful submit or
    /// an explicit clear-all).
    pub fn clear_session(&self, contest_id: Option<&str>) -> Result<()> {
        self.lock()
            .execute(
                "DELETE FROM builder_sessions WHERE contest_id = ?1",
                params![contest_id.unwrap_or("")],
            )
            .context("failed to clear builder session")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SelectionSnapshot {
        SelectionSnapshot {
            men: vec!["m0".to_string(), "m1".to_string()],
            women: vec!["w0".to_string()],
            captain: Some("m0".to_string()),
            vice_captain: None,
            step: 2,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let db = SessionDb::open(":memory:").unwrap();
        db.save_session(Some("c1"), &snapshot()).unwrap();

        let loaded = db.load_session(Some("c1")).unwrap().unwrap();
        assert_eq!(loaded.men, vec!["m0", "m1"]);
        assert_eq!(loaded.women, vec!["w0"]);
        assert_eq!(loaded.captain.as_deref(), Some("m0"));
        assert_eq!(loaded.vice_captain, None);
        assert_eq!(loaded.step, 2);
    }

    #[test]
    fn load_missing_session_is_none() {
        let db = SessionDb::open(":memory:").unwrap();
        assert!(db.load_session(Some("c1")).unwrap().is_none());
    }

    #[test]
    fn sessions_are_scoped_per_contest() {
        let db = SessionDb::open(":memory:").unwrap();
        db.save_session(Some("c1"), &snapshot()).unwrap();
        db.save_session(None, &snapshot()).unwrap();

        assert!(db.load_session(Some("c1")).unwrap().is_some());
        assert!(db.load_session(None).unwrap().is_some());
        assert!(db.load_session(Some("c2")).unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let db = SessionDb::open(":memory:").unwrap();
        db.save_session(Some("c1"), &snapshot()).unwrap();

        let mut updated = snapshot();
        updated.men.push("m2".to_string());
        updated.step = 3;
        db.save_session(Some("c1"), &updated).unwrap();

        let loaded = db.load_session(Some("c1")).unwrap().unwrap();
        assert_eq!(loaded.men.len(), 3);
        assert_eq!(loaded.step, 3);
    }

    #[test]
    fn clear_removes_only_that_contest() {
        let db = SessionDb::open(":memory:").unwrap();
        db.save_session(Some("c1"), &snapshot()).unwrap();
        db.save_session(Some("c2"), &snapshot()).unwrap();

        db.clear_session(Some("c1")).unwrap();
        assert!(db.load_session(Some("c1")).unwrap().is_none());
        assert!(db.load_session(Some("c2")).unwrap().is_some());
    }
}
