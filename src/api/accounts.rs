//! Client, advertiser, and relevance-score endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::models::{Advertiser, Client, MlScore};

/// POST /clients/bulk — upsert a batch, echoing the stored entries
pub(crate) async fn upsert_clients(
    State(state): State<AppState>,
    Json(clients): Json<Vec<Client>>,
) -> Result<(StatusCode, Json<Vec<Client>>), ApiError> {
    let stored = state.engine.accounts.upsert_clients(clients).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /clients/:client_id
pub(crate) async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, ApiError> {
    let client = state.engine.accounts.get_client(client_id)?;
    Ok(Json(client))
}

/// POST /advertisers/bulk
pub(crate) async fn upsert_advertisers(
    State(state): State<AppState>,
    Json(advertisers): Json<Vec<Advertiser>>,
) -> Result<(StatusCode, Json<Vec<Advertiser>>), ApiError> {
    let stored = state.engine.accounts.upsert_advertisers(advertisers).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /advertisers/:advertiser_id
pub(crate) async fn get_advertiser(
    State(state): State<AppState>,
    Path(advertiser_id): Path<Uuid>,
) -> Result<Json<Advertiser>, ApiError> {
    let advertiser = state.engine.accounts.get_advertiser(advertiser_id)?;
    Ok(Json(advertiser))
}

/// POST /ml-scores — upsert one relevance score
pub(crate) async fn upsert_ml_score(
    State(state): State<AppState>,
    Json(score): Json<MlScore>,
) -> Result<StatusCode, ApiError> {
    state.engine.accounts.upsert_ml_score(score).await?;
    Ok(StatusCode::OK)
}
