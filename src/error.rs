//! Error handling
//!
//! Single translation point from failure kinds to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::validate::FieldError;
use crate::logic::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Model artifacts are not loaded
    NotReady(String),

    /// Request body does not match the feature schema
    ValidationError(Vec<FieldError>),

    /// Scaling, prediction or explanation failed
    ComputationError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ComputationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::NotReady(msg) => {
                tracing::warn!("Prediction refused: {}", msg);
                json!({ "error": msg, "status": status.as_u16() })
            }
            AppError::ValidationError(details) => {
                tracing::debug!("Validation failed on {} field(s)", details.len());
                json!({
                    "error": "Request body does not match the feature schema",
                    "status": status.as_u16(),
                    "details": details,
                })
            }
            AppError::ComputationError(msg) => {
                tracing::error!("Prediction error: {}", msg);
                json!({ "error": format!("Prediction error: {}", msg), "status": status.as_u16() })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::NotReady { missing } => AppError::NotReady(format!(
                "Model not loaded ({} unavailable). Place the model and scaler artifacts in the model directory and restart the server.",
                missing.join(", ")
            )),
            computation @ PredictError::Computation { .. } => {
                AppError::ComputationError(computation.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: "body".to_string(),
            message: rejection.body_text(),
        }])
    }
}
