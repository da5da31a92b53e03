//! Platform singletons: the simulated day and the moderation flag
//!
//! Both live as single rows in platform_state and change only through
//! conditional one-statement updates, so the clock can never move backwards
//! even under concurrent advances.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

use crate::db::Database;

/// Result of a compare-and-set on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceDay {
    /// The clock now reads this day (advancing to the current day counts).
    Advanced(i64),
    /// The requested day was behind the stored one; nothing changed.
    Behind { current: i64 },
}

pub struct PlatformStore {
    conn: Arc<Mutex<Connection>>,
}

impl PlatformStore {
    pub fn new(db: &Database) -> Self {
        Self { conn: db.conn() }
    }

    pub fn current_day(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let day: i64 = conn
            .query_row(
                "SELECT CAST(value AS INTEGER) FROM platform_state WHERE key = 'current_day'",
                [],
                |row| row.get(0),
            )
            .context("Failed to read the current day")?;
        Ok(day)
    }

    /// The WHERE clause is the monotonicity guard: the row only changes when
    /// the stored day is at or before the requested one.
    pub async fn advance_day(&self, new_day: i64) -> Result<AdvanceDay> {
        let conn = self.conn.lock();
        let changes = conn.execute(
            "UPDATE platform_state SET value = ?1
             WHERE key = 'current_day' AND CAST(value AS INTEGER) <= ?2",
            params![new_day.to_string(), new_day],
        )?;
        if changes > 0 {
            return Ok(AdvanceDay::Advanced(new_day));
        }

        let current: i64 = conn.query_row(
            "SELECT CAST(value AS INTEGER) FROM platform_state WHERE key = 'current_day'",
            [],
            |row| row.get(0),
        )?;
        Ok(AdvanceDay::Behind { current })
    }

    pub fn moderation_enabled(&self) -> Result<bool> {
        let conn = self.conn.lock();
        let value: String = conn.query_row(
            "SELECT value FROM platform_state WHERE key = 'moderation_enabled'",
            [],
            |row| row.get(0),
        )?;
        Ok(value != "0")
    }

    /// Flip the flag and return its new state in one statement.
    pub async fn toggle_moderation(&self) -> Result<bool> {
        let conn = self.conn.lock();
        let value: String = conn
            .query_row(
                "UPDATE platform_state
                 SET value = CASE value WHEN '1' THEN '0' ELSE '1' END
                 WHERE key = 'moderation_enabled'
                 RETURNING value",
                [],
                |row| row.get(0),
            )
            .context("Failed to toggle the moderation flag")?;
        Ok(value == "1")
    }
}
