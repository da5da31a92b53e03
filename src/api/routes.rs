use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{accounts, ads, campaigns, platform, AppState};
use crate::engine::Engine;

/// Create the API router
pub fn create_router(engine: Engine, request_timeout: Duration) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(health_check))
        .route("/clients/bulk", post(accounts::upsert_clients))
        .route("/clients/:client_id", get(accounts::get_client))
        .route("/advertisers/bulk", post(accounts::upsert_advertisers))
        .route("/advertisers/:advertiser_id", get(accounts::get_advertiser))
        .route("/ml-scores", post(accounts::upsert_ml_score))
        .route(
            "/advertisers/:advertiser_id/campaigns",
            post(campaigns::create_campaign).get(campaigns::list_campaigns),
        )
        .route(
            "/advertisers/:advertiser_id/campaigns/:campaign_id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/ads", get(ads::select_ad))
        .route("/ads/:ad_id/click", post(ads::record_click))
        .route("/ads/generate-text", post(ads::generate_text))
        .route("/time/advance", post(platform::advance_day))
        .route("/moderation/toggle", post(platform::toggle_moderation))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
