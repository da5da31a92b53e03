//! Client, advertiser, and relevance-score services

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Advertiser, Client, MlScore};
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<AccountStore>,
}

impl AccountService {
    pub fn new(accounts: Arc<AccountStore>) -> Self {
        Self { accounts }
    }

    /// Every entry is validated before anything is written; one bad entry
    /// fails the whole batch.
    pub async fn upsert_clients(&self, clients: Vec<Client>) -> Result<Vec<Client>, EngineError> {
        for client in &clients {
            client.validate()?;
        }
        self.accounts.upsert_clients(&clients).await?;
        info!("Upserted {} clients", clients.len());
        Ok(clients)
    }

    pub fn get_client(&self, id: Uuid) -> Result<Client, EngineError> {
        self.accounts
            .get_client(&id)?
            .ok_or(EngineError::ClientNotFound)
    }

    pub async fn upsert_advertisers(
        &self,
        advertisers: Vec<Advertiser>,
    ) -> Result<Vec<Advertiser>, EngineError> {
        self.accounts.upsert_advertisers(&advertisers).await?;
        info!("Upserted {} advertisers", advertisers.len());
        Ok(advertisers)
    }

    pub fn get_advertiser(&self, id: Uuid) -> Result<Advertiser, EngineError> {
        self.accounts
            .get_advertiser(&id)?
            .ok_or(EngineError::AdvertiserNotFound)
    }

    /// Scores only rank ads, but both sides of the pair must exist.
    pub async fn upsert_ml_score(&self, score: MlScore) -> Result<(), EngineError> {
        if !self.accounts.client_exists(&score.client_id)? {
            return Err(EngineError::ClientNotFound);
        }
        if !self.accounts.advertiser_exists(&score.advertiser_id)? {
            return Err(EngineError::AdvertiserNotFound);
        }
        self.accounts.upsert_ml_score(&score).await?;
        Ok(())
    }
}
