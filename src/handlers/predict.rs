//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::logic::validate::validate_record;
use crate::models::PredictionResult;
use crate::{AppError, AppResult, AppState};

/// Classify a candidate and explain the decision
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    span.in_scope(|| -> AppResult<Json<PredictionResult>> {
        let Json(body) = body?;
        let record = validate_record(&body).map_err(AppError::ValidationError)?;
        tracing::info!("Received prediction request");

        let result = state.model.predict(&record)?;
        tracing::info!(
            "Prediction complete: {} ({:.2}% confidence)",
            result.prediction,
            result.confidence
        );

        Ok(Json(result))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::logic::context::tests::{fake_context, FakeScorer};
    use crate::logic::demo::demo_candidate;
    use crate::logic::ModelContext;
    use crate::models::ClassLabel;

    fn demo_body() -> Value {
        serde_json::to_value(demo_candidate().features).unwrap()
    }

    async fn call(state: AppState, body: Value) -> AppResult<Json<PredictionResult>> {
        predict(State(state), Ok(Json(body))).await
    }

    #[tokio::test]
    async fn test_demo_record() {
        let state = AppState::for_tests(fake_context(Arc::new(FakeScorer::planet())));
        let Json(result) = call(state, demo_body()).await.unwrap();

        assert_eq!(result.prediction, ClassLabel::ConfirmedPlanet);
        assert_eq!(result.confidence, 97.0);
        assert_eq!(result.probability_planet, 97.0);
        assert_eq!(result.probability_false_positive, 3.0);
        assert_eq!(result.top_reasons.len(), 5);

        for pair in result.top_reasons.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
        for reason in &result.top_reasons {
            assert!((reason.importance - reason.shap_value.abs()).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_scorer() {
        let scorer = Arc::new(FakeScorer::planet());
        let state = AppState::for_tests(fake_context(scorer.clone()));

        let mut body = demo_body();
        body.as_object_mut().unwrap().remove("koi_prad");

        let err = call(state, body).await.unwrap_err();
        match err {
            AppError::ValidationError(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "koi_prad");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_ready_is_503() {
        let state = AppState::for_tests(ModelContext::unloaded());
        let err = call(state, demo_body()).await.unwrap_err();

        assert!(matches!(err, AppError::NotReady(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_same_record_same_result() {
        let state = AppState::for_tests(fake_context(Arc::new(FakeScorer::planet())));
        let Json(first) = call(state.clone(), demo_body()).await.unwrap();
        let Json(second) = call(state, demo_body()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_class_is_500() {
        let mut scorer = FakeScorer::planet();
        scorer.class_index = 7;
        let state = AppState::for_tests(fake_context(Arc::new(scorer)));

        let err = call(state, demo_body()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_response_json_shape() {
        let state = AppState::for_tests(fake_context(Arc::new(FakeScorer::planet())));
        let Json(result) = call(state, demo_body()).await.unwrap();
        let json = serde_json::to_value(result).unwrap();

        assert_eq!(json["prediction"], "CONFIRMED PLANET");
        let reason = &json["top_reasons"][0];
        for key in ["feature", "feature_readable", "value", "impact", "shap_value", "importance"] {
            assert!(reason.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(reason, &json!({
            "feature": "koi_model_snr",
            "feature_readable": "Model Snr",
            "value": 42.3,
            "impact": "strongly increases",
            "shap_value": 0.6,
            "importance": 0.6,
        }));
    }
}
