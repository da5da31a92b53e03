//! Simulated clock and moderation endpoints

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(crate) struct AdvanceDayRequest {
    pub current_date: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdvanceDayResponse {
    pub current_date: i64,
}

/// POST /time/advance — move the simulated clock forward
pub(crate) async fn advance_day(
    State(state): State<AppState>,
    Json(payload): Json<AdvanceDayRequest>,
) -> Result<Json<AdvanceDayResponse>, ApiError> {
    let current_date = state.engine.platform.advance_day(payload.current_date).await?;
    Ok(Json(AdvanceDayResponse { current_date }))
}

#[derive(Debug, Serialize)]
pub(crate) struct ModerationResponse {
    pub is_moderated: bool,
}

/// POST /moderation/toggle — flip the moderation flag
pub(crate) async fn toggle_moderation(
    State(state): State<AppState>,
) -> Result<Json<ModerationResponse>, ApiError> {
    let is_moderated = state.engine.platform.toggle_moderation().await?;
    Ok(Json(ModerationResponse { is_moderated }))
}
