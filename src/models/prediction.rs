//! Prediction model

use serde::{Deserialize, Serialize};

/// The two classes the scorer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLabel {
    #[serde(rename = "FALSE POSITIVE")]
    FalsePositive,
    #[serde(rename = "CONFIRMED PLANET")]
    ConfirmedPlanet,
}

impl ClassLabel {
    /// Map a scorer class index; only 0 and 1 exist
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::FalsePositive),
            1 => Some(Self::ConfirmedPlanet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FalsePositive => "FALSE POSITIVE",
            Self::ConfirmedPlanet => "CONFIRMED PLANET",
        }
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked entry of the explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub feature: String,
    pub feature_readable: String,
    pub value: f64,
    /// e.g. "strongly increases"
    pub impact: String,
    pub shap_value: f64,
    pub importance: f64,
}

/// Response of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: ClassLabel,
    pub confidence: f64,
    pub probability_planet: f64,
    pub probability_false_positive: f64,
    pub top_reasons: Vec<Reason>,
}
