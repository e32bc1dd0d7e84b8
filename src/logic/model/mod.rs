//! Model Module - scaler, classifier and explainer behind narrow traits.
//!
//! The HTTP layer only sees the traits; the concrete artifacts are a
//! LightGBM tree dump and a standard-scaler parameter file, both JSON.

pub mod artifact;
pub mod scaler;
pub mod shap;
pub mod tree;

pub use artifact::ArtifactInfo;
pub use scaler::StandardScaler;
pub use shap::TreeShapExplainer;
pub use tree::TreeEnsemble;

use std::path::PathBuf;

use ndarray::{Array1, ArrayView1};
use thiserror::Error;

use crate::logic::layout::FEATURE_COUNT;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure while loading an artifact at startup
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model: {0}")]
    Unsupported(String),

    #[error("feature layout mismatch: {0}")]
    LayoutMismatch(String),
}

/// Failure while scoring a single vector
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("expected {expected} features, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("non-finite value in {stage} output")]
    NonFinite { stage: &'static str },
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Deterministic normalization fitted at training time
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, raw: &[f64; FEATURE_COUNT]) -> Result<Array1<f64>, ScoreError>;
}

/// Binary classifier over a scaled vector
pub trait Classifier: Send + Sync {
    /// `[p_false_positive, p_planet]`
    fn predict_proba(&self, scaled: ArrayView1<'_, f64>) -> Result<[f64; 2], ScoreError>;

    /// Arg-max class index; a tie goes to class 0
    fn predict(&self, scaled: ArrayView1<'_, f64>) -> Result<usize, ScoreError> {
        let [p0, p1] = self.predict_proba(scaled)?;
        Ok(if p1 > p0 { 1 } else { 0 })
    }
}

/// Per-feature signed contributions toward the positive class
pub trait Explainer: Send + Sync {
    fn contributions(&self, scaled: ArrayView1<'_, f64>) -> Result<Vec<f64>, ScoreError>;
}

pub(crate) fn check_shape(scaled: &ArrayView1<'_, f64>) -> Result<(), ScoreError> {
    if scaled.len() != FEATURE_COUNT {
        return Err(ScoreError::Shape {
            expected: FEATURE_COUNT,
            actual: scaled.len(),
        });
    }
    Ok(())
}
