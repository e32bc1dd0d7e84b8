//! Model Context - the loaded scaler / classifier / explainer.
//!
//! Built once at startup and shared read-only by every request. A handle that
//! failed to load stays `None`; the service then runs degraded and refuses
//! predictions instead of exiting.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::logic::assemble::{assemble, AssembleError};
use crate::logic::explain::{rank, ExplainError, TOP_K};
use crate::logic::layout::FEATURE_LAYOUT;
use crate::logic::model::{
    ArtifactInfo, Classifier, Explainer, FeatureScaler, ScoreError, StandardScaler,
    TreeEnsemble, TreeShapExplainer,
};
use crate::models::{FeatureRecord, PredictionResult};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("not loaded: {}", .missing.join(", "))]
    NotReady { missing: Vec<&'static str> },

    #[error("{stage} failed: {message}")]
    Computation { stage: &'static str, message: String },
}

impl PredictError {
    fn at(stage: &'static str) -> impl Fn(ScoreError) -> Self {
        move |e| Self::Computation { stage, message: e.to_string() }
    }
}

impl From<ExplainError> for PredictError {
    fn from(e: ExplainError) -> Self {
        Self::Computation { stage: "explanation", message: e.to_string() }
    }
}

impl From<AssembleError> for PredictError {
    fn from(e: AssembleError) -> Self {
        Self::Computation { stage: "prediction", message: e.to_string() }
    }
}

/// Which handles are usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStatus {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub explainer_loaded: bool,
}

impl LoadStatus {
    pub fn ready(&self) -> bool {
        self.model_loaded && self.scaler_loaded && self.explainer_loaded
    }
}

/// Provenance of the artifacts that did load
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ArtifactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ArtifactInfo>,
}

#[derive(Clone, Default)]
pub struct ModelContext {
    scaler: Option<Arc<dyn FeatureScaler>>,
    classifier: Option<Arc<dyn Classifier>>,
    explainer: Option<Arc<dyn Explainer>>,
    artifacts: ArtifactSet,
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("status", &self.status())
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

impl ModelContext {
    /// Context with explicit handles
    pub fn new(
        scaler: Option<Arc<dyn FeatureScaler>>,
        classifier: Option<Arc<dyn Classifier>>,
        explainer: Option<Arc<dyn Explainer>>,
    ) -> Self {
        Self { scaler, classifier, explainer, artifacts: ArtifactSet::default() }
    }

    /// Nothing loaded
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Load both artifacts. Never fails; failures are logged and leave the
    /// matching handle empty.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Self {
        tracing::info!("Looking for model artifacts");
        tracing::info!("  model:  {} (exists: {})", model_path.display(), model_path.exists());
        tracing::info!("  scaler: {} (exists: {})", scaler_path.display(), scaler_path.exists());

        let mut artifacts = ArtifactSet::default();
        let mut classifier: Option<Arc<dyn Classifier>> = None;
        let mut explainer: Option<Arc<dyn Explainer>> = None;
        let mut scaler: Option<Arc<dyn FeatureScaler>> = None;

        match TreeEnsemble::load(model_path) {
            Ok((ensemble, info)) => {
                let ensemble = Arc::new(ensemble);
                classifier = Some(ensemble.clone());
                artifacts.model = Some(info);

                match TreeShapExplainer::new(ensemble) {
                    Ok(shap) => explainer = Some(Arc::new(shap)),
                    Err(e) => tracing::error!("Failed to create SHAP explainer: {}", e),
                }
            }
            Err(e) => tracing::error!("Failed to load model: {}", e),
        }

        match StandardScaler::load(scaler_path) {
            Ok((standard, info)) => {
                scaler = Some(Arc::new(standard));
                artifacts.scaler = Some(info);
            }
            Err(e) => tracing::error!("Failed to load scaler: {}", e),
        }

        let mut ctx = Self::new(scaler, classifier, explainer);
        ctx.artifacts = artifacts;

        if ctx.status().ready() {
            tracing::info!("All systems ready");
        } else {
            tracing::warn!(
                "Starting without predictions: place {} and {} and restart",
                model_path.display(),
                scaler_path.display()
            );
        }

        ctx
    }

    pub fn status(&self) -> LoadStatus {
        LoadStatus {
            model_loaded: self.classifier.is_some(),
            scaler_loaded: self.scaler.is_some(),
            explainer_loaded: self.explainer.is_some(),
        }
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Scale → predict → explain → rank → assemble
    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
        let (scaler, classifier, explainer) = match (&self.scaler, &self.classifier, &self.explainer) {
            (Some(s), Some(c), Some(e)) => (s, c, e),
            _ => return Err(PredictError::NotReady { missing: self.missing() }),
        };

        let raw = record.to_vector();

        let scaled = scaler.transform(&raw).map_err(PredictError::at("scaling"))?;
        tracing::debug!("Features scaled");

        let class_index = classifier.predict(scaled.view()).map_err(PredictError::at("prediction"))?;
        let probabilities = classifier
            .predict_proba(scaled.view())
            .map_err(PredictError::at("prediction"))?;
        tracing::debug!("Prediction: {} (probabilities: {:?})", class_index, probabilities);

        let contributions = explainer
            .contributions(scaled.view())
            .map_err(PredictError::at("explanation"))?;

        let top_reasons = rank(FEATURE_LAYOUT, &contributions, &raw, TOP_K)?;
        Ok(assemble(class_index, probabilities, top_reasons)?)
    }

    fn missing(&self) -> Vec<&'static str> {
        let status = self.status();
        [
            (!status.model_loaded, "model"),
            (!status.scaler_loaded, "scaler"),
            (!status.explainer_loaded, "explainer"),
        ]
        .into_iter()
        .filter_map(|(missing, name)| missing.then_some(name))
        .collect()
    }
}
