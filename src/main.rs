//! Adserve - Ad Delivery & Campaign Budget Engine
//! Mission: serve the most relevant ad each budget allows, and never overshoot

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adserve_backend::{
    api::create_router,
    db::Database,
    engine::{BlocklistClassifier, Engine, TextIntelligence},
    models::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adserve_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Adserve engine starting");

    let config = Config::from_env()?;
    let db = Database::open(&config.database_path)?;

    let classifier: Arc<dyn TextIntelligence> =
        Arc::new(BlocklistClassifier::from_config(&config));
    let engine = Engine::new(&db, classifier);

    let app = create_router(engine, Duration::from_secs(config.request_timeout_secs));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Standard dotenv search first, then the crate directory so runs started
/// from elsewhere still pick up the local .env.
fn load_env() {
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
