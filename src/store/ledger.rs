//! Impression and click ledger
//!
//! Recording is a single conditional INSERT: the WHERE clause carries the
//! budget cap and the composite primary key carries idempotency. There is
//! no check-then-insert anywhere, so concurrent requests can neither
//! overshoot a limit nor double-record a (campaign, client) pair.

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::Database;

/// What a conditional ledger insert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// New row written; the pair now counts against the budget.
    Created,
    /// The pair was recorded earlier; nothing written.
    AlreadyExisted,
    /// The cap is reached and the pair had no prior row.
    Exhausted,
}

pub struct LedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerStore {
    pub fn new(db: &Database) -> Self {
        Self { conn: db.conn() }
    }

    pub async fn record_impression(
        &self,
        campaign_id: &Uuid,
        client_id: &Uuid,
        limit: i64,
    ) -> Result<RecordOutcome> {
        self.record("impressions", campaign_id, client_id, limit)
    }

    pub async fn record_click(
        &self,
        campaign_id: &Uuid,
        client_id: &Uuid,
        limit: i64,
    ) -> Result<RecordOutcome> {
        self.record("clicks", campaign_id, client_id, limit)
    }

    fn record(
        &self,
        table: &'static str,
        campaign_id: &Uuid,
        client_id: &Uuid,
        limit: i64,
    ) -> Result<RecordOutcome> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        let changes = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {table} (campaign_id, client_id, recorded_at)
                     SELECT ?1, ?2, ?3
                     WHERE (SELECT COUNT(*) FROM {table} WHERE campaign_id = ?1) < ?4"
                ),
                params![campaign_id.to_string(), client_id.to_string(), now, limit],
            )
            .with_context(|| format!("Failed to write the {} ledger", table))?;
        if changes > 0 {
            return Ok(RecordOutcome::Created);
        }

        // Nothing written: either the pair already exists (OR IGNORE) or the
        // cap filtered the SELECT. Same guard, so the answer is consistent.
        let exists: i64 = conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {table} WHERE campaign_id = ?1 AND client_id = ?2)"
            ),
            params![campaign_id.to_string(), client_id.to_string()],
            |row| row.get(0),
        )?;
        if exists != 0 {
            Ok(RecordOutcome::AlreadyExisted)
        } else {
            Ok(RecordOutcome::Exhausted)
        }
    }

    pub fn impressions_count(&self, campaign_id: &Uuid) -> Result<i64> {
        self.count("impressions", campaign_id)
    }

    pub fn clicks_count(&self, campaign_id: &Uuid) -> Result<i64> {
        self.count("clicks", campaign_id)
    }

    fn count(&self, table: &'static str, campaign_id: &Uuid) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE campaign_id = ?1"),
            params![campaign_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
