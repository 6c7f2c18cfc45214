//! Sign Language Prediction Server
//!
//! Serves a pre-trained hand-landmark classifier to the mobile app.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 SIGN PREDICTION SERVER                   │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────┐    │
//! │  │  Router   │──▶│  Inference                       │    │
//! │  │  (Axum)   │   │  scale → predict → decode → conf │    │
//! │  └───────────┘   └────────────────┬─────────────────┘    │
//! │                                   ▼                      │
//! │                  ┌──────────────────────────────────┐    │
//! │                  │  ArtifactBundle (read-only, Arc) │    │
//! │                  │  classifier · labels · scaler    │    │
//! │                  └──────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod artifacts;
mod config;
mod error;
mod handlers;
mod inference;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::Arc;

use artifacts::ArtifactBundle;

pub use error::AppResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "sign_predict_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("{}", "=".repeat(50));
    tracing::info!("Starting Sign Language Prediction Server");
    tracing::info!("{}", "=".repeat(50));
    tracing::info!("Artifact directory: {}", config.artifact_dir.display());

    // Artifacts are loaded before the listener exists, so no request sees a partial bundle
    let artifacts = ArtifactBundle::load(&config.artifact_dir);
    if artifacts.is_ready() {
        tracing::info!("Server ready!");
    } else {
        tracing::warn!(
            "Service {:?}: /predict will answer 503 until restarted with the artifacts in place",
            artifacts.state()
        );
    }

    let app = create_router(AppState::new(artifacts));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<ArtifactBundle>,
}

impl AppState {
    pub fn new(artifacts: ArtifactBundle) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root::info))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Wildcards can't carry credentials, so echo the caller's origin, methods and headers
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        )
        .with_state(state)
}
