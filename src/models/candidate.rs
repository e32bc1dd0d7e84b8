//! Candidate model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::layout::FEATURE_COUNT;

/// One transit-signal candidate, fields in layout order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecord {
    pub koi_period: f64,
    pub koi_time0bk: f64,
    pub koi_impact: f64,
    pub koi_duration: f64,
    pub koi_depth: f64,
    pub koi_prad: f64,
    pub koi_teq: f64,
    pub koi_insol: f64,
    pub koi_model_snr: f64,
    pub koi_tce_plnt_num: f64,
    pub koi_steff: f64,
    pub koi_slogg: f64,
    pub koi_srad: f64,
    pub ra: f64,
    pub dec: f64,
    pub koi_kepmag: f64,
    #[validate(range(min = 0, max = 1, message = "flag must be 0 or 1"))]
    pub koi_fpflag_nt: i64,
    #[validate(range(min = 0, max = 1, message = "flag must be 0 or 1"))]
    pub koi_fpflag_ss: i64,
    #[validate(range(min = 0, max = 1, message = "flag must be 0 or 1"))]
    pub koi_fpflag_co: i64,
    #[validate(range(min = 0, max = 1, message = "flag must be 0 or 1"))]
    pub koi_fpflag_ec: i64,
}

impl FeatureRecord {
    /// Raw (unscaled) values in layout order
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.koi_period,
            self.koi_time0bk,
            self.koi_impact,
            self.koi_duration,
            self.koi_depth,
            self.koi_prad,
            self.koi_teq,
            self.koi_insol,
            self.koi_model_snr,
            self.koi_tce_plnt_num,
            self.koi_steff,
            self.koi_slogg,
            self.koi_srad,
            self.ra,
            self.dec,
            self.koi_kepmag,
            self.koi_fpflag_nt as f64,
            self.koi_fpflag_ss as f64,
            self.koi_fpflag_co as f64,
            self.koi_fpflag_ec as f64,
        ]
    }
}

/// Illustrative candidate served by the demo endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DemoCandidate {
    pub name: &'static str,
    pub mission: &'static str,
    pub description: &'static str,
    pub features: FeatureRecord,
}

/// Random pick from the demo pool
#[derive(Debug, Clone, Serialize)]
pub struct DemoSample {
    pub success: bool,
    pub data: FeatureRecord,
    pub row_number: usize,
}
