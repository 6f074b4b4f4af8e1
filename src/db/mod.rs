mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::models::{OverlayMode, TournamentSettings};
use crate::service::StateStore;
use crate::tournament::{Bracket, MatchResult, Roster, Tournament};

/// SQLite-backed store for the tournament.
///
/// The roster lives in `contestants` (one row per name, in roster order); the
/// bracket, settings and version live in the single `tournament_state` row.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "battle-bracket")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("tournament.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Tournament state
    // ============================================================

    pub fn load_tournament(&self) -> Result<Option<Tournament>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let row = conn
            .query_row(
                "SELECT version, bracket, title, overlay_mode, last_result
                 FROM tournament_state WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((version, bracket, title, overlay_mode, last_result)) = row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT name FROM contestants ORDER BY position")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let roster = Roster::from_names(names).context("Stored roster is invalid")?;
        let bracket = bracket
            .map(|json| serde_json::from_str::<Bracket>(&json))
            .transpose()
            .context("Stored bracket is not valid JSON")?;
        let last_result = last_result
            .map(|json| serde_json::from_str::<MatchResult>(&json))
            .transpose()
            .context("Stored last result is not valid JSON")?;
        let overlay_mode = OverlayMode::from_str(&overlay_mode)
            .ok_or_else(|| anyhow::anyhow!("Stored overlay mode {:?} is unknown", overlay_mode))?;
        let settings = TournamentSettings {
            title,
            overlay_mode,
        };

        let tournament = Tournament::restore(roster, bracket, settings, last_result, version as u64)
            .context("Stored tournament is inconsistent")?;
        Ok(Some(tournament))
    }

    pub fn save_tournament(&self, tournament: &Tournament) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM contestants", [])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO contestants (position, name) VALUES (?, ?)")?;
            for (position, name) in tournament.roster().list().iter().enumerate() {
                insert.execute((position as i64, name))?;
            }
        }

        let bracket = tournament
            .bracket()
            .map(serde_json::to_string)
            .transpose()?;
        let last_result = tournament
            .last_result()
            .map(serde_json::to_string)
            .transpose()?;
        let settings = tournament.settings();

        tx.execute(
            "INSERT INTO tournament_state (id, version, bracket, title, overlay_mode, last_result, updated_at)
             VALUES (1, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                version = excluded.version,
                bracket = excluded.bracket,
                title = excluded.title,
                overlay_mode = excluded.overlay_mode,
                last_result = excluded.last_result,
                updated_at = excluded.updated_at",
            (
                tournament.version() as i64,
                &bracket,
                &settings.title,
                settings.overlay_mode.as_str(),
                &last_result,
                Utc::now().to_rfc3339(),
            ),
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Remove every saved trace of the tournament.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute_batch(
            "BEGIN TRANSACTION;
             DELETE FROM contestants;
             DELETE FROM tournament_state;
             COMMIT;",
        )?;
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> Result<Option<Tournament>> {
        self.load_tournament()
    }

    fn save(&self, tournament: &Tournament) -> Result<()> {
        self.save_tournament(tournament)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
