//! Shared SQLite handle
//!
//! One connection behind a mutex, handed to every store. All durable state
//! lives here: accounts, campaigns, the impression/click ledger, and the
//! platform singletons (simulated day, moderation flag). The schema is
//! idempotent so reopening an existing database preserves its contents.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tracing::{info, warn};

/// Schema and per-connection pragmas, applied on every open.
const SCHEMA_SQL: &str = r#"
-- WAL keeps readers unblocked during ledger writes
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS advertisers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    login TEXT NOT NULL,
    age INTEGER NOT NULL,
    location TEXT NOT NULL,
    gender TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY,
    advertiser_id TEXT NOT NULL REFERENCES advertisers(id) ON DELETE CASCADE,
    impressions_limit INTEGER NOT NULL,
    clicks_limit INTEGER NOT NULL,
    cost_per_impression REAL NOT NULL,
    cost_per_click REAL NOT NULL,
    ad_title TEXT NOT NULL,
    ad_text TEXT NOT NULL,
    start_day INTEGER NOT NULL,
    end_day INTEGER NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_campaigns_advertiser
    ON campaigns(advertiser_id, created_at, id);

CREATE INDEX IF NOT EXISTS idx_campaigns_window
    ON campaigns(start_day, end_day);

-- 1:1 with campaigns; NULL columns mean "no constraint" on that dimension
CREATE TABLE IF NOT EXISTS campaign_targeting (
    campaign_id TEXT PRIMARY KEY REFERENCES campaigns(id) ON DELETE CASCADE,
    gender TEXT,
    age_from INTEGER,
    age_to INTEGER,
    location TEXT
) WITHOUT ROWID;

-- The composite PRIMARY KEY is what makes impression recording idempotent
-- per (campaign, client); the application never checks before inserting.
CREATE TABLE IF NOT EXISTS impressions (
    campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
    client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (campaign_id, client_id)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS clicks (
    campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
    client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (campaign_id, client_id)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS ml_scores (
    client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
    advertiser_id TEXT NOT NULL REFERENCES advertisers(id) ON DELETE CASCADE,
    score INTEGER NOT NULL,
    PRIMARY KEY (client_id, advertiser_id)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS platform_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
) WITHOUT ROWID;

INSERT OR IGNORE INTO platform_state (key, value) VALUES ('current_day', '0');
INSERT OR IGNORE INTO platform_state (key, value) VALUES ('moderation_enabled', '0');
"#;

/// Database handle shared by all stores.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file and apply the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();

        if journal_mode.to_lowercase() != "wal" {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        let campaigns: i64 = conn
            .query_row("SELECT COUNT(*) FROM campaigns", [], |row| row.get(0))
            .unwrap_or(0);

        info!("📊 Database initialized at: {}", db_path);
        info!("📈 Existing campaigns in database: {}", campaigns);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}
