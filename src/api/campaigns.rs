//! Campaign management endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::models::{Campaign, CampaignDraft};

/// POST /advertisers/:advertiser_id/campaigns
pub(crate) async fn create_campaign(
    State(state): State<AppState>,
    Path(advertiser_id): Path<Uuid>,
    Json(draft): Json<CampaignDraft>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = state.engine.campaigns.create(advertiser_id, draft).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    pub size: Option<i64>,
    pub page: Option<i64>,
}

/// GET /advertisers/:advertiser_id/campaigns
pub(crate) async fn list_campaigns(
    State(state): State<AppState>,
    Path(advertiser_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let size = query.size.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(0).max(0);
    let campaigns = state.engine.campaigns.list(advertiser_id, size, page)?;
    Ok(Json(campaigns))
}

/// GET /advertisers/:advertiser_id/campaigns/:campaign_id
pub(crate) async fn get_campaign(
    State(state): State<AppState>,
    Path((advertiser_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = state.engine.campaigns.get(advertiser_id, campaign_id)?;
    Ok(Json(campaign))
}

/// PUT /advertisers/:advertiser_id/campaigns/:campaign_id
pub(crate) async fn update_campaign(
    State(state): State<AppState>,
    Path((advertiser_id, campaign_id)): Path<(Uuid, Uuid)>,
    Json(draft): Json<CampaignDraft>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = state
        .engine
        .campaigns
        .update(advertiser_id, campaign_id, draft)
        .await?;
    Ok(Json(campaign))
}

/// DELETE /advertisers/:advertiser_id/campaigns/:campaign_id
pub(crate) async fn delete_campaign(
    State(state): State<AppState>,
    Path((advertiser_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .campaigns
        .delete(advertiser_id, campaign_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
