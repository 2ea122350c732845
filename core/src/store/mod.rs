//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine never touches SQL; the runner hands finished reports here.

use crate::{error::RoyaltyResult, types::RunId};
mod report;
mod statement;
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::str::FromStr;

pub struct RoyaltyStore {
    conn: Connection,
}

impl RoyaltyStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> RoyaltyResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RoyaltyResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RoyaltyResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id:  &str,
        name:    Option<&str>,
        advance: Decimal,
        version: &str,
    ) -> RoyaltyResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, name, advance, version, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                name,
                advance.to_string(),
                version,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        log::debug!("run {run_id} recorded");
        Ok(())
    }

    pub fn run_advance(&self, run_id: &str) -> RoyaltyResult<Option<Decimal>> {
        let advance = self
            .conn
            .query_row(
                "SELECT advance FROM run WHERE run_id = ?1",
                params![run_id],
                |row| decimal_column(row, 0),
            )
            .optional()?;
        Ok(advance)
    }

    pub fn run_ids(&self) -> RoyaltyResult<Vec<RunId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT run_id FROM run ORDER BY created_at ASC, run_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn run_count(&self) -> RoyaltyResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ── Column helpers ─────────────────────────────────────────────

fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<chrono::NaiveDate> {
    let text: String = row.get(idx)?;
    chrono::NaiveDate::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
