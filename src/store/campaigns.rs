//! Campaign persistence
//!
//! A campaign and its targeting row always move together: inserts and
//! updates run in one immediate transaction, deletes cascade through the
//! foreign keys. Reads join the two tables back into a single [`Campaign`].

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, TransactionBehavior};
use std::sync::Arc;
use uuid::Uuid;

use super::uuid_column;
use crate::db::Database;
use crate::models::{Campaign, TargetGender, Targeting};

/// Campaign joined with the requesting client's relevance score and the
/// impression count at query time.
#[derive(Debug, Clone)]
pub struct DeliveryCandidate {
    pub campaign: Campaign,
    pub impressions_count: i64,
    pub score: i64,
}

pub struct CampaignStore {
    conn: Arc<Mutex<Connection>>,
}

impl CampaignStore {
    pub fn new(db: &Database) -> Self {
        Self { conn: db.conn() }
    }

    pub async fn insert(&self, campaign: &Campaign) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO campaigns (id, advertiser_id, impressions_limit, clicks_limit,
                                    cost_per_impression, cost_per_click, ad_title, ad_text,
                                    start_day, end_day, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                campaign.id.to_string(),
                campaign.advertiser_id.to_string(),
                campaign.impressions_limit,
                campaign.clicks_limit,
                campaign.cost_per_impression,
                campaign.cost_per_click,
                campaign.ad_title,
                campaign.ad_text,
                campaign.start_day,
                campaign.end_day,
                now,
            ],
        )?;
        tx.execute(
            "INSERT INTO campaign_targeting (campaign_id, gender, age_from, age_to, location)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                campaign.id.to_string(),
                campaign.targeting.gender.map(|g| g.as_str()),
                campaign.targeting.age_from,
                campaign.targeting.age_to,
                campaign.targeting.location,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Returns false when no campaign matches the (advertiser, campaign) pair.
    pub async fn update(&self, campaign: &Campaign) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changes = tx.execute(
            "UPDATE campaigns
             SET impressions_limit = ?3, clicks_limit = ?4, cost_per_impression = ?5,
                 cost_per_click = ?6, ad_title = ?7, ad_text = ?8, start_day = ?9, end_day = ?10
             WHERE id = ?1 AND advertiser_id = ?2",
            params![
                campaign.id.to_string(),
                campaign.advertiser_id.to_string(),
                campaign.impressions_limit,
                campaign.clicks_limit,
                campaign.cost_per_impression,
                campaign.cost_per_click,
                campaign.ad_title,
                campaign.ad_text,
                campaign.start_day,
                campaign.end_day,
            ],
        )?;
        if changes == 0 {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO campaign_targeting (campaign_id, gender, age_from, age_to, location)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(campaign_id) DO UPDATE SET
                gender = excluded.gender,
                age_from = excluded.age_from,
                age_to = excluded.age_to,
                location = excluded.location",
            params![
                campaign.id.to_string(),
                campaign.targeting.gender.map(|g| g.as_str()),
                campaign.targeting.age_from,
                campaign.targeting.age_to,
                campaign.targeting.location,
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Campaign>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.advertiser_id, c.impressions_limit, c.clicks_limit,
                    c.cost_per_impression, c.cost_per_click, c.ad_title, c.ad_text,
                    c.start_day, c.end_day, t.gender, t.age_from, t.age_to, t.location
             FROM campaigns c
             JOIN campaign_targeting t ON t.campaign_id = c.id
             WHERE c.id = ?1",
        )?;
        match stmt.query_row(params![id.to_string()], Self::row_to_campaign) {
            Ok(campaign) => Ok(Some(campaign)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_for_advertiser(
        &self,
        advertiser_id: &Uuid,
        campaign_id: &Uuid,
    ) -> Result<Option<Campaign>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.advertiser_id, c.impressions_limit, c.clicks_limit,
                    c.cost_per_impression, c.cost_per_click, c.ad_title, c.ad_text,
                    c.start_day, c.end_day, t.gender, t.age_from, t.age_to, t.location
             FROM campaigns c
             JOIN campaign_targeting t ON t.campaign_id = c.id
             WHERE c.id = ?1 AND c.advertiser_id = ?2",
        )?;
        match stmt.query_row(
            params![campaign_id.to_string(), advertiser_id.to_string()],
            Self::row_to_campaign,
        ) {
            Ok(campaign) => Ok(Some(campaign)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Page through an advertiser's campaigns in creation order.
    pub fn list(&self, advertiser_id: &Uuid, size: i64, page: i64) -> Result<Vec<Campaign>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.advertiser_id, c.impressions_limit, c.clicks_limit,
                    c.cost_per_impression, c.cost_per_click, c.ad_title, c.ad_text,
                    c.start_day, c.end_day, t.gender, t.age_from, t.age_to, t.location
             FROM campaigns c
             JOIN campaign_targeting t ON t.campaign_id = c.id
             WHERE c.advertiser_id = ?1
             ORDER BY c.created_at, c.id
             LIMIT ?2 OFFSET ?3",
        )?;
        let campaigns = stmt
            .query_map(
                params![advertiser_id.to_string(), size, size * page],
                Self::row_to_campaign,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(campaigns)
    }

    /// Targeting and ledger rows go with the campaign through the cascades.
    pub async fn delete(&self, advertiser_id: &Uuid, campaign_id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let changes = conn.execute(
            "DELETE FROM campaigns WHERE id = ?1 AND advertiser_id = ?2",
            params![campaign_id.to_string(), advertiser_id.to_string()],
        )?;
        Ok(changes > 0)
    }

    /// Campaigns whose date window covers `day`, each carrying the client's
    /// relevance score (0 when unscored) and the current impression count.
    /// Targeting and budget filtering stay in the engine.
    pub fn delivery_candidates(
        &self,
        client_id: &Uuid,
        day: i64,
    ) -> Result<Vec<DeliveryCandidate>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.advertiser_id, c.impressions_limit, c.clicks_limit,
                    c.cost_per_impression, c.cost_per_click, c.ad_title, c.ad_text,
                    c.start_day, c.end_day, t.gender, t.age_from, t.age_to, t.location,
                    (SELECT COUNT(*) FROM impressions i WHERE i.campaign_id = c.id),
                    COALESCE(m.score, 0)
             FROM campaigns c
             JOIN campaign_targeting t ON t.campaign_id = c.id
             LEFT JOIN ml_scores m
                    ON m.advertiser_id = c.advertiser_id AND m.client_id = ?1
             WHERE c.start_day <= ?2 AND c.end_day >= ?2",
        )?;
        let candidates = stmt
            .query_map(params![client_id.to_string(), day], Self::row_to_candidate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(candidates)
    }

    #[inline]
    fn row_to_campaign(row: &rusqlite::Row) -> rusqlite::Result<Campaign> {
        let id: String = row.get(0)?;
        let advertiser_id: String = row.get(1)?;
        let gender = match row.get::<_, Option<String>>(10)? {
            Some(value) => Some(TargetGender::from_str(&value).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    10,
                    rusqlite::types::Type::Text,
                    format!("unknown targeting gender '{}'", value).into(),
                )
            })?),
            None => None,
        };
        Ok(Campaign {
            id: uuid_column(0, &id)?,
            advertiser_id: uuid_column(1, &advertiser_id)?,
            impressions_limit: row.get(2)?,
            clicks_limit: row.get(3)?,
            cost_per_impression: row.get(4)?,
            cost_per_click: row.get(5)?,
            ad_title: row.get(6)?,
            ad_text: row.get(7)?,
            start_day: row.get(8)?,
            end_day: row.get(9)?,
            targeting: Targeting {
                gender,
                age_from: row.get(11)?,
                age_to: row.get(12)?,
                location: row.get(13)?,
            },
        })
    }

    #[inline]
    fn row_to_candidate(row: &rusqlite::Row) -> rusqlite::Result<DeliveryCandidate> {
        Ok(DeliveryCandidate {
            campaign: Self::row_to_campaign(row)?,
            impressions_count: row.get(14)?,
            score: row.get(15)?,
        })
    }
}
