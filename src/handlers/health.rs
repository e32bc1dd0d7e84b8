//! Health and readiness handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::context::ArtifactSet;
use crate::logic::layout::FEATURE_COUNT;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// Liveness: the process is up
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub message: String,
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub explainer_loaded: bool,
    pub features_required: usize,
    pub ready_for_predictions: bool,
    pub artifacts: ArtifactSet,
}

/// Readiness: can `/predict` be served
pub async fn readiness(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let status = state.model.status();
    let ready = status.ready();

    Json(ReadinessResponse {
        message: format!(
            "ExoNet API v{}.{} - AI-Powered Exoplanet Discovery",
            env!("CARGO_PKG_VERSION_MAJOR"),
            env!("CARGO_PKG_VERSION_MINOR")
        ),
        status: if ready { "operational" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        model_loaded: status.model_loaded,
        scaler_loaded: status.scaler_loaded,
        explainer_loaded: status.explainer_loaded,
        features_required: FEATURE_COUNT,
        ready_for_predictions: ready,
        artifacts: state.model.artifacts().clone(),
    })
}
