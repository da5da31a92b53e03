//! Moderation gate and the ad-text intelligence boundary
//!
//! [`TextIntelligence`] is the seam for content classification and copy
//! generation; the in-crate implementation is a deterministic blocklist
//! classifier with a template generator. [`ModerationGate`] consults the
//! platform flag on every call, so toggling takes effect immediately.

use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use crate::error::EngineError;
use crate::store::PlatformStore;

#[async_trait::async_trait]
pub trait TextIntelligence: Send + Sync {
    /// True when the text is acceptable for serving.
    async fn validate(&self, text: &str) -> Result<bool>;

    /// Produce ad copy for an advertiser and title.
    async fn generate_ad_text(&self, advertiser_name: &str, ad_title: &str) -> Result<String>;
}

/// Case-insensitive substring classifier over a configured blocklist.
pub struct BlocklistClassifier {
    blocklist: Vec<String>,
}

impl BlocklistClassifier {
    pub fn new(blocklist: Vec<String>) -> Self {
        Self {
            blocklist: blocklist
                .into_iter()
                .map(|phrase| phrase.to_lowercase())
                .filter(|phrase| !phrase.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &crate::models::Config) -> Self {
        Self::new(config.moderation_blocklist.clone())
    }
}

#[async_trait::async_trait]
impl TextIntelligence for BlocklistClassifier {
    async fn validate(&self, text: &str) -> Result<bool> {
        let lowered = text.to_lowercase();
        Ok(!self.blocklist.iter().any(|phrase| lowered.contains(phrase)))
    }

    async fn generate_ad_text(&self, advertiser_name: &str, ad_title: &str) -> Result<String> {
        Ok(format!(
            "{} brings you {}. Find out more today.",
            advertiser_name, ad_title
        ))
    }
}

/// Applies the moderation flag to requested ad content.
#[derive(Clone)]
pub struct ModerationGate {
    platform: Arc<PlatformStore>,
    classifier: Arc<dyn TextIntelligence>,
}

impl ModerationGate {
    pub fn new(platform: Arc<PlatformStore>, classifier: Arc<dyn TextIntelligence>) -> Self {
        Self {
            platform,
            classifier,
        }
    }

    /// No-op while the flag is off; otherwise the title and text are
    /// classified together and a flagged result rejects the write.
    pub async fn ensure_allowed(&self, ad_title: &str, ad_text: &str) -> Result<(), EngineError> {
        if !self.platform.moderation_enabled()? {
            return Ok(());
        }

        let combined = format!("{} {}", ad_title, ad_text);
        if self.classifier.validate(&combined).await? {
            Ok(())
        } else {
            warn!(ad_title, "ad content rejected by moderation");
            Err(EngineError::ModerationRejected)
        }
    }
}
