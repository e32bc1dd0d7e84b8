//! Demo data handlers

use axum::Json;

use crate::logic::demo;
use crate::models::{DemoCandidate, DemoSample};
use crate::{AppError, AppResult};

/// Fixed showcase record
pub async fn candidate() -> Json<DemoCandidate> {
    Json(demo::demo_candidate())
}

/// Random record from the TESS pool
pub async fn sample() -> AppResult<Json<DemoSample>> {
    let sample = demo::random_sample(&mut rand::thread_rng())
        .ok_or_else(|| AppError::ComputationError("demo pool is empty".to_string()))?;
    tracing::debug!("Serving demo row {}", sample.row_number);
    Ok(Json(sample))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_candidate_shape() {
        let Json(demo) = candidate().await;
        let json = serde_json::to_value(&demo).unwrap();

        assert_eq!(json["name"], "TOI-700 d (TESS Confirmed Planet)");
        assert_eq!(json["features"]["koi_period"], 37.4242);
        assert_eq!(json["features"]["koi_fpflag_ec"], 0);
        assert_eq!(json["features"].as_object().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_sample() {
        let Json(body) = sample().await.unwrap();
        assert!(body.success);
        assert!(body.row_number >= 71);
    }
}
