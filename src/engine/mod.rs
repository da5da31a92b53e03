//! Decision logic over the stores
//!
//! Services own the business rules; stores own the SQL. [`Engine`] wires
//! one of each over a shared database and clones cheaply into request
//! handlers.

pub mod accounts;
pub mod campaigns;
pub mod delivery;
pub mod moderation;
pub mod platform;
pub mod targeting;

pub use accounts::AccountService;
pub use campaigns::CampaignService;
pub use delivery::AdDelivery;
pub use moderation::{BlocklistClassifier, ModerationGate, TextIntelligence};
pub use platform::PlatformService;

use std::sync::Arc;

use crate::db::Database;
use crate::store::{AccountStore, CampaignStore, LedgerStore, PlatformStore};

/// All services wired over one database.
#[derive(Clone)]
pub struct Engine {
    pub accounts: AccountService,
    pub campaigns: CampaignService,
    pub delivery: AdDelivery,
    pub platform: PlatformService,
    pub intelligence: Arc<dyn TextIntelligence>,
}

impl Engine {
    pub fn new(db: &Database, intelligence: Arc<dyn TextIntelligence>) -> Self {
        let accounts = Arc::new(AccountStore::new(db));
        let campaigns = Arc::new(CampaignStore::new(db));
        let ledger = Arc::new(LedgerStore::new(db));
        let platform = Arc::new(PlatformStore::new(db));

        let moderation = ModerationGate::new(platform.clone(), intelligence.clone());

        Self {
            accounts: AccountService::new(accounts.clone()),
            campaigns: CampaignService::new(
                accounts.clone(),
                campaigns.clone(),
                platform.clone(),
                moderation,
            ),
            delivery: AdDelivery::new(accounts, campaigns, ledger, platform.clone()),
            platform: PlatformService::new(platform),
            intelligence,
        }
    }
}
