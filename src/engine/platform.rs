//! Simulated clock and moderation flag service

use std::sync::Arc;
use tracing::info;

use crate::error::EngineError;
use crate::store::{AdvanceDay, PlatformStore};

#[derive(Clone)]
pub struct PlatformService {
    platform: Arc<PlatformStore>,
}

impl PlatformService {
    pub fn new(platform: Arc<PlatformStore>) -> Self {
        Self { platform }
    }

    pub fn current_day(&self) -> Result<i64, EngineError> {
        Ok(self.platform.current_day()?)
    }

    /// Move the clock to `new_day`. Re-setting the current day succeeds as
    /// a no-op; moving backwards is refused with the stored day attached.
    pub async fn advance_day(&self, new_day: i64) -> Result<i64, EngineError> {
        match self.platform.advance_day(new_day).await? {
            AdvanceDay::Advanced(day) => {
                info!(day, "clock advanced");
                Ok(day)
            }
            AdvanceDay::Behind { current } => Err(EngineError::DateRegression {
                requested: new_day,
                current,
            }),
        }
    }

    pub async fn toggle_moderation(&self) -> Result<bool, EngineError> {
        let enabled = self.platform.toggle_moderation().await?;
        info!(enabled, "moderation flag toggled");
        Ok(enabled)
    }
}
