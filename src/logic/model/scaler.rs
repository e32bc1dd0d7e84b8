//! Standard scaler: `(x - mean) / scale` per feature.
//!
//! Parameters come from a fitted scikit-learn `StandardScaler` exported as
//! `{"mean": [...], "scale": [...], "feature_names": [...]}`. `mean` / `scale`
//! are `null` when the scaler was fitted with `with_mean=False` /
//! `with_std=False`.

use std::path::Path;

use ndarray::Array1;
use serde::Deserialize;

use super::artifact::{load_json, ArtifactInfo};
use super::{ArtifactError, FeatureScaler, ScoreError};
use crate::logic::layout::{names_match_layout, FEATURE_COUNT};

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Option<Vec<f64>>, scale: Option<Vec<f64>>) -> Result<Self, ArtifactError> {
        let mean = match mean {
            Some(m) => check_len("mean", m)?,
            None => vec![0.0; FEATURE_COUNT],
        };
        let scale = match scale {
            Some(s) => check_len("scale", s)?,
            None => vec![1.0; FEATURE_COUNT],
        };

        if let Some(bad) = mean.iter().chain(&scale).find(|v| !v.is_finite()) {
            return Err(ArtifactError::Unsupported(format!("non-finite scaler parameter {}", bad)));
        }

        // Constant columns were fitted with scale 0; leave them centred only
        let scale = scale.into_iter().map(|s| if s == 0.0 { 1.0 } else { s }).collect();

        Ok(Self {
            mean: Array1::from_vec(mean),
            scale: Array1::from_vec(scale),
        })
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactInfo), ArtifactError> {
        let (file, info) = load_json::<ScalerFile>(path)?;

        if let Some(names) = &file.feature_names {
            if !names_match_layout(names) {
                return Err(ArtifactError::LayoutMismatch(format!(
                    "scaler was fitted on columns {:?}",
                    names
                )));
            }
        }

        let scaler = Self::new(file.mean, file.scale)?;
        tracing::info!("Scaler loaded from {}", path.display());
        Ok((scaler, info))
    }
}

fn check_len(what: &str, values: Vec<f64>) -> Result<Vec<f64>, ArtifactError> {
    if values.len() != FEATURE_COUNT {
        return Err(ArtifactError::LayoutMismatch(format!(
            "scaler {} has {} entries, expected {}",
            what,
            values.len(),
            FEATURE_COUNT
        )));
    }
    Ok(values)
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, raw: &[f64; FEATURE_COUNT]) -> Result<Array1<f64>, ScoreError> {
        let raw = Array1::from_iter(raw.iter().copied());
        let scaled = (raw - &self.mean) / &self.scale;

        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(ScoreError::NonFinite { stage: "scaler" });
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ramp(start: f64) -> Vec<f64> {
        (0..FEATURE_COUNT).map(|i| start + i as f64).collect()
    }

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(Some(ramp(0.0)), Some(vec![2.0; FEATURE_COUNT])).unwrap();
        let raw: [f64; FEATURE_COUNT] = std::array::from_fn(|i| i as f64 + 4.0);

        let scaled = scaler.transform(&raw).unwrap();
        assert!(scaled.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_defaults_and_zero_scale() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[3] = 0.0;
        let scaler = StandardScaler::new(None, Some(scale)).unwrap();

        let raw = [5.0; FEATURE_COUNT];
        let scaled = scaler.transform(&raw).unwrap();
        assert_eq!(scaled[3], 5.0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let scaler = StandardScaler::new(None, Some(vec![1e-300; FEATURE_COUNT])).unwrap();
        let raw = [1e300; FEATURE_COUNT];
        assert_eq!(
            scaler.transform(&raw).unwrap_err(),
            ScoreError::NonFinite { stage: "scaler" }
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = StandardScaler::new(Some(vec![0.0; 19]), None).unwrap_err();
        assert!(matches!(err, ArtifactError::LayoutMismatch(_)));
    }

    #[test]
    fn test_load_checks_names() {
        let mut names: Vec<String> = crate::logic::layout::FEATURE_LAYOUT
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.reverse();

        let body = serde_json::json!({
            "mean": ramp(0.0),
            "scale": ramp(1.0),
            "feature_names": names,
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.to_string().as_bytes()).unwrap();

        let err = StandardScaler::load(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::LayoutMismatch(_)));
    }

    #[test]
    fn test_load_ok() {
        let body = serde_json::json!({ "mean": ramp(0.0), "scale": null });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.to_string().as_bytes()).unwrap();

        let (scaler, info) = StandardScaler::load(file.path()).unwrap();
        let scaled = scaler.transform(&[10.0; FEATURE_COUNT]).unwrap();
        assert_eq!(scaled[0], 10.0);
        assert_eq!(scaled[19], -9.0);
        assert_eq!(info.sha256.len(), 64);
    }
}
