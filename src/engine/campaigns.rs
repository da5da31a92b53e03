//! Campaign write service
//!
//! Ordering on writes: owner check, shape validation, date window against
//! the clock, moderation, then persistence. Once a campaign's start day has
//! passed, its limits and date window freeze; the rest stays editable.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::engine::moderation::ModerationGate;
use crate::error::EngineError;
use crate::models::{Campaign, CampaignDraft};
use crate::store::{AccountStore, CampaignStore, PlatformStore};

#[derive(Clone)]
pub struct CampaignService {
    accounts: Arc<AccountStore>,
    campaigns: Arc<CampaignStore>,
    platform: Arc<PlatformStore>,
    moderation: ModerationGate,
}

impl CampaignService {
    pub fn new(
        accounts: Arc<AccountStore>,
        campaigns: Arc<CampaignStore>,
        platform: Arc<PlatformStore>,
        moderation: ModerationGate,
    ) -> Self {
        Self {
            accounts,
            campaigns,
            platform,
            moderation,
        }
    }

    pub async fn create(
        &self,
        advertiser_id: Uuid,
        draft: CampaignDraft,
    ) -> Result<Campaign, EngineError> {
        if !self.accounts.advertiser_exists(&advertiser_id)? {
            return Err(EngineError::AdvertiserNotFound);
        }
        draft.validate()?;

        let today = self.platform.current_day()?;
        if draft.start_day < today {
            return Err(EngineError::bad_request("start_day cannot be in the past"));
        }
        if draft.end_day < draft.start_day {
            return Err(EngineError::bad_request(
                "end_day cannot be before start_day",
            ));
        }

        self.moderation
            .ensure_allowed(&draft.ad_title, &draft.ad_text)
            .await?;

        let campaign = Campaign::from_draft(Uuid::new_v4(), advertiser_id, draft);
        self.campaigns.insert(&campaign).await?;
        info!(campaign_id = %campaign.id, advertiser_id = %advertiser_id, "campaign created");
        Ok(campaign)
    }

    pub async fn update(
        &self,
        advertiser_id: Uuid,
        campaign_id: Uuid,
        draft: CampaignDraft,
    ) -> Result<Campaign, EngineError> {
        if !self.accounts.advertiser_exists(&advertiser_id)? {
            return Err(EngineError::AdvertiserNotFound);
        }
        let existing = self
            .campaigns
            .get_for_advertiser(&advertiser_id, &campaign_id)?
            .ok_or(EngineError::AdNotFound)?;

        let today = self.platform.current_day()?;
        let effective = resolve_update(&existing, draft, today)?;
        effective.validate()?;
        self.moderation
            .ensure_allowed(&effective.ad_title, &effective.ad_text)
            .await?;

        let campaign = Campaign::from_draft(campaign_id, advertiser_id, effective);
        if !self.campaigns.update(&campaign).await? {
            return Err(EngineError::AdNotFound);
        }
        info!(campaign_id = %campaign_id, "campaign updated");
        Ok(campaign)
    }

    pub fn get(&self, advertiser_id: Uuid, campaign_id: Uuid) -> Result<Campaign, EngineError> {
        self.campaigns
            .get_for_advertiser(&advertiser_id, &campaign_id)?
            .ok_or(EngineError::AdNotFound)
    }

    pub fn list(
        &self,
        advertiser_id: Uuid,
        size: i64,
        page: i64,
    ) -> Result<Vec<Campaign>, EngineError> {
        if !self.accounts.advertiser_exists(&advertiser_id)? {
            return Err(EngineError::AdvertiserNotFound);
        }
        Ok(self.campaigns.list(&advertiser_id, size, page)?)
    }

    pub async fn delete(
        &self,
        advertiser_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<(), EngineError> {
        if !self.accounts.advertiser_exists(&advertiser_id)? {
            return Err(EngineError::AdvertiserNotFound);
        }
        if !self.campaigns.delete(&advertiser_id, &campaign_id).await? {
            return Err(EngineError::AdNotFound);
        }
        info!(campaign_id = %campaign_id, "campaign deleted");
        Ok(())
    }
}

/// Work out which requested fields an update may apply. A started campaign
/// keeps its original limits and date window; those requested values are
/// ignored rather than rejected. An unstarted campaign may move its window
/// as long as it stays in the future and stays ordered.
fn resolve_update(
    existing: &Campaign,
    mut requested: CampaignDraft,
    today: i64,
) -> Result<CampaignDraft, EngineError> {
    if existing.has_started(today) {
        requested.impressions_limit = existing.impressions_limit;
        requested.clicks_limit = existing.clicks_limit;
        requested.start_day = existing.start_day;
        requested.end_day = existing.end_day;
        return Ok(requested);
    }

    if requested.start_day < today {
        return Err(EngineError::bad_request("start_day cannot be in the past"));
    }
    if requested.end_day < requested.start_day {
        return Err(EngineError::bad_request(
            "end_day cannot be before start_day",
        ));
    }
    Ok(requested)
}
