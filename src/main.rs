//! ExoNet API Server
//!
//! Classifies Kepler/TESS objects of interest as confirmed planets or false
//! positives and explains each decision with per-feature SHAP contributions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EXONET API                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  HTTP     │  │ Validator │  │  Model Context          │ │
//! │  │  Router   │─▶│ (20 feat) │─▶│  scaler → trees → SHAP  │ │
//! │  │  (Axum)   │  │           │  │  (read-only, shared)    │ │
//! │  └───────────┘  └───────────┘  └────────────┬────────────┘ │
//! │                                              ▼              │
//! │                                   ┌─────────────────────┐  │
//! │                                   │ rank → assemble     │  │
//! │                                   └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::logic::ModelContext;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(&config);

    tracing::info!("ExoNet API v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);

    // Load model artifacts once; failures leave the service degraded
    let model = ModelContext::load(&config.model_path(), &config.scaler_path());

    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let default_filter = if config.is_production() {
        "exonet_api=info,tower_http=info"
    } else {
        "exonet_api=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelContext>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    pub(crate) fn for_tests(model: ModelContext) -> Self {
        Self {
            model: Arc::new(model),
            config: Config::default(),
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::readiness))
        .route("/health", get(handlers::health::check))
        .route("/features", get(handlers::features::list))
        .route("/demo-data", get(handlers::demo::candidate))
        .route("/demo-data/sample", get(handlers::demo::sample))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
