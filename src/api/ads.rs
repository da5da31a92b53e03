//! Ad serving endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::error::EngineError;
use crate::models::ServedAd;

#[derive(Debug, Deserialize)]
pub(crate) struct AdsQuery {
    pub client_id: Uuid,
}

/// GET /ads — serve the most relevant ad for a client
pub(crate) async fn select_ad(
    State(state): State<AppState>,
    Query(query): Query<AdsQuery>,
) -> Result<Json<ServedAd>, ApiError> {
    let ad = state.engine.delivery.select_ad(query.client_id).await?;
    Ok(Json(ad))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClickRequest {
    pub client_id: Uuid,
}

/// POST /ads/:ad_id/click — record a click, idempotent per (ad, client)
pub(crate) async fn record_click(
    State(state): State<AppState>,
    Path(ad_id): Path<Uuid>,
    Json(payload): Json<ClickRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .delivery
        .record_click(ad_id, payload.client_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateTextRequest {
    pub advertiser_name: String,
    pub ad_title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateTextResponse {
    pub ad_text: String,
}

/// POST /ads/generate-text — draft ad copy from advertiser name and title
pub(crate) async fn generate_text(
    State(state): State<AppState>,
    Json(payload): Json<GenerateTextRequest>,
) -> Result<Json<GenerateTextResponse>, ApiError> {
    let ad_text = state
        .engine
        .intelligence
        .generate_ad_text(&payload.advertiser_name, &payload.ad_title)
        .await
        .map_err(EngineError::Internal)?;
    Ok(Json(GenerateTextResponse { ad_text }))
}
