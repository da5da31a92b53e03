//! Ad selection and click recording
//!
//! Selection ranks the eligible candidates by relevance score and walks
//! them in order, letting the ledger's conditional insert arbitrate the
//! budget. A candidate that turns out exhausted between the query and the
//! insert is skipped, never served.

use tracing::debug;
use uuid::Uuid;

use crate::engine::targeting;
use crate::error::EngineError;
use crate::models::{Campaign, ServedAd};
use crate::store::{AccountStore, CampaignStore, LedgerStore, PlatformStore, RecordOutcome};
use std::sync::Arc;

#[derive(Clone)]
pub struct AdDelivery {
    accounts: Arc<AccountStore>,
    campaigns: Arc<CampaignStore>,
    ledger: Arc<LedgerStore>,
    platform: Arc<PlatformStore>,
}

impl AdDelivery {
    pub fn new(
        accounts: Arc<AccountStore>,
        campaigns: Arc<CampaignStore>,
        ledger: Arc<LedgerStore>,
        platform: Arc<PlatformStore>,
    ) -> Self {
        Self {
            accounts,
            campaigns,
            ledger,
            platform,
        }
    }

    /// Pick the most relevant eligible ad for a client and record the
    /// impression. Serving the same ad to the same client again returns the
    /// ad without consuming more budget.
    pub async fn select_ad(&self, client_id: Uuid) -> Result<ServedAd, EngineError> {
        let client = self
            .accounts
            .get_client(&client_id)?
            .ok_or(EngineError::ClientNotFound)?;
        let today = self.platform.current_day()?;

        let mut candidates = self.campaigns.delivery_candidates(&client_id, today)?;
        candidates.retain(|c| {
            c.impressions_count < c.campaign.impressions_limit
                && targeting::matches(&client, &c.campaign.targeting)
        });

        // Highest relevance first; campaign id keeps ties stable.
        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.campaign.id.cmp(&b.campaign.id))
        });

        for candidate in &candidates {
            let outcome = self
                .ledger
                .record_impression(
                    &candidate.campaign.id,
                    &client_id,
                    candidate.campaign.impressions_limit,
                )
                .await?;
            match outcome {
                RecordOutcome::Created => {
                    debug!(
                        campaign_id = %candidate.campaign.id,
                        client_id = %client_id,
                        "impression recorded"
                    );
                    return Ok(ServedAd::from_campaign(&candidate.campaign));
                }
                RecordOutcome::AlreadyExisted => {
                    return Ok(ServedAd::from_campaign(&candidate.campaign));
                }
                // The last slot went to a concurrent request after the
                // candidate query; move on to the next ranked campaign.
                RecordOutcome::Exhausted => continue,
            }
        }

        Err(EngineError::NoEligibleAd)
    }

    /// Record a click on a served ad. Clicks past the campaign's cap are
    /// acknowledged but not written, so the budget holds while the caller
    /// still sees success.
    pub async fn record_click(&self, ad_id: Uuid, client_id: Uuid) -> Result<(), EngineError> {
        if !self.accounts.client_exists(&client_id)? {
            return Err(EngineError::ClientNotFound);
        }
        let campaign = self
            .campaigns
            .get(&ad_id)?
            .ok_or(EngineError::AdNotFound)?;

        let outcome = self
            .ledger
            .record_click(&ad_id, &client_id, campaign.clicks_limit)
            .await?;
        match outcome {
            RecordOutcome::Created => {
                debug!(campaign_id = %ad_id, client_id = %client_id, "click recorded");
            }
            RecordOutcome::AlreadyExisted => {}
            RecordOutcome::Exhausted => {
                debug!(campaign_id = %ad_id, "click budget exhausted, click dropped");
            }
        }
        Ok(())
    }

    pub fn remaining_impressions(&self, campaign: &Campaign) -> Result<i64, EngineError> {
        let used = self.ledger.impressions_count(&campaign.id)?;
        Ok((campaign.impressions_limit - used).max(0))
    }

    pub fn remaining_clicks(&self, campaign: &Campaign) -> Result<i64, EngineError> {
        let used = self.ledger.clicks_count(&campaign.id)?;
        Ok((campaign.clicks_limit - used).max(0))
    }
}
