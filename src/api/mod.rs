//! HTTP surface
//!
//! Handlers stay thin: decode, call a service, encode. Engine errors map
//! to status codes in one place so every endpoint reports the same shape,
//! a JSON object with a single "error" field.

pub mod routes;

mod accounts;
mod ads;
mod campaigns;
mod platform;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::engine::Engine;
use crate::error::EngineError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

/// Translates engine errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EngineError::ClientNotFound
            | EngineError::AdvertiserNotFound
            | EngineError::AdNotFound
            | EngineError::NoEligibleAd => (StatusCode::NOT_FOUND, self.0.to_string()),
            EngineError::BadRequest(_)
            | EngineError::ModerationRejected
            | EngineError::DateRegression { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            EngineError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
