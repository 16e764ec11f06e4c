//! SQLite-based break history and statistics.
//!
//! Every finished break is one row. Totals are derived on read, so the
//! scheduler's in-memory counters can be seeded from `stats_all()` at
//! startup.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::events::BreakOutcome;
use crate::timer::BreakStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakRecord {
    pub id: i64,
    pub outcome: String,
    pub duration_secs: u64,
    pub ended_at: DateTime<Utc>,
}

/// SQLite database for break history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/starepatrol/starepatrol.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("starepatrol.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS breaks (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                outcome       TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                ended_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_breaks_ended_at ON breaks(ended_at);",
        )?;
        Ok(())
    }

    /// Record a finished break.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_break(
        &self,
        outcome: BreakOutcome,
        duration_secs: u64,
        ended_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO breaks (outcome, duration_secs, ended_at) VALUES (?1, ?2, ?3)",
            params![outcome.as_str(), duration_secs, ended_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent breaks, newest first.
    pub fn recent_breaks(&self, limit: usize) -> Result<Vec<BreakRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, outcome, duration_secs, ended_at
             FROM breaks
             ORDER BY ended_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, outcome, duration_secs, ended_at) = row?;
            let ended_at = DateTime::parse_from_rfc3339(&ended_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DatabaseError::QueryFailed(format!("bad ended_at '{ended_at}': {e}")))?;
            records.push(BreakRecord {
                id,
                outcome,
                duration_secs,
                ended_at,
            });
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<BreakStats, DatabaseError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.stats_since(&format!("{today}T00:00:00+00:00"))
    }

    pub fn stats_all(&self) -> Result<BreakStats, DatabaseError> {
        self.stats_since("")
    }

    fn stats_since(&self, since: &str) -> Result<BreakStats, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT outcome, COUNT(*)
             FROM breaks
             WHERE ended_at >= ?1
             GROUP BY outcome",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut stats = BreakStats::default();
        for row in rows {
            let (outcome, count) = row?;
            match outcome.as_str() {
                "taken" => stats.breaks_taken += count,
                "skipped" => stats.breaks_skipped += count,
                _ => {}
            }
        }
        Ok(stats)
    }
}
