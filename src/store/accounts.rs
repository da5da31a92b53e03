//! Client, advertiser, and relevance-score persistence
//!
//! Bulk writes run inside an immediate transaction so a batch lands fully
//! or not at all. Upserts keep the original created_at stamp.

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, TransactionBehavior};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::uuid_column;
use crate::db::Database;
use crate::models::{Advertiser, Client, Gender, MlScore};

pub struct AccountStore {
    conn: Arc<Mutex<Connection>>,
}

impl AccountStore {
    pub fn new(db: &Database) -> Self {
        Self { conn: db.conn() }
    }

    pub async fn upsert_clients(&self, clients: &[Client]) -> Result<()> {
        if clients.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for client in clients {
            tx.execute(
                "INSERT INTO clients (id, login, age, location, gender, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    login = excluded.login,
                    age = excluded.age,
                    location = excluded.location,
                    gender = excluded.gender",
                params![
                    client.id.to_string(),
                    client.login,
                    client.age,
                    client.location,
                    client.gender.as_str(),
                    now,
                ],
            )?;
        }
        tx.commit()?;

        debug!("Upserted {} clients", clients.len());
        Ok(())
    }

    pub fn get_client(&self, id: &Uuid) -> Result<Option<Client>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, login, age, location, gender FROM clients WHERE id = ?1",
        )?;
        match stmt.query_row(params![id.to_string()], Self::row_to_client) {
            Ok(client) => Ok(Some(client)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn client_exists(&self, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    pub async fn upsert_advertisers(&self, advertisers: &[Advertiser]) -> Result<()> {
        if advertisers.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for advertiser in advertisers {
            tx.execute(
                "INSERT INTO advertisers (id, name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                params![advertiser.id.to_string(), advertiser.name, now],
            )?;
        }
        tx.commit()?;

        debug!("Upserted {} advertisers", advertisers.len());
        Ok(())
    }

    pub fn get_advertiser(&self, id: &Uuid) -> Result<Option<Advertiser>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT id, name FROM advertisers WHERE id = ?1")?;
        match stmt.query_row(params![id.to_string()], Self::row_to_advertiser) {
            Ok(advertiser) => Ok(Some(advertiser)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn advertiser_exists(&self, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM advertisers WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    /// Latest write wins for a (client, advertiser) pair.
    pub async fn upsert_ml_score(&self, score: &MlScore) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO ml_scores (client_id, advertiser_id, score) VALUES (?1, ?2, ?3)
             ON CONFLICT(client_id, advertiser_id) DO UPDATE SET score = excluded.score",
            params![
                score.client_id.to_string(),
                score.advertiser_id.to_string(),
                score.score,
            ],
        )?;
        Ok(())
    }

    #[inline]
    fn row_to_client(row: &rusqlite::Row) -> rusqlite::Result<Client> {
        let id: String = row.get(0)?;
        let gender: String = row.get(4)?;
        Ok(Client {
            id: uuid_column(0, &id)?,
            login: row.get(1)?,
            age: row.get(2)?,
            location: row.get(3)?,
            gender: Gender::from_str(&gender).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    format!("unknown gender '{}'", gender).into(),
                )
            })?,
        })
    }

    #[inline]
    fn row_to_advertiser(row: &rusqlite::Row) -> rusqlite::Result<Advertiser> {
        let id: String = row.get(0)?;
        Ok(Advertiser {
            id: uuid_column(0, &id)?,
            name: row.get(1)?,
        })
    }
}
