use thiserror::Error;

/// Errors surfaced by the delivery and campaign services.
///
/// Stores report failures as `anyhow::Error`; services translate the ones
/// with domain meaning and wrap the rest in `Internal`. The HTTP layer maps
/// each variant to a status code.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("client not found")]
    ClientNotFound,

    #[error("advertiser not found")]
    AdvertiserNotFound,

    #[error("ad not found")]
    AdNotFound,

    #[error("no ad available for this client")]
    NoEligibleAd,

    #[error("{0}")]
    BadRequest(String),

    #[error("ad content rejected by moderation")]
    ModerationRejected,

    #[error("cannot move the current day backwards: requested {requested}, current {current}")]
    DateRegression { requested: i64, current: i64 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        EngineError::BadRequest(msg.into())
    }
}
