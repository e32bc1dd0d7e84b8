//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the candidate schema.**
//!
//! The classifier and the scaler were both fitted on columns in exactly this
//! order. Request validation, scaling, scoring and explanation all index into
//! vectors laid out by `FEATURE_LAYOUT`.
//!
//! ## Rules:
//! 1. Add / remove / reorder a feature → increment FEATURE_VERSION
//! 2. Any change here requires retrained artifacts

use crc32fast::Hasher;
use serde::Serialize;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the model input
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Transit geometry (0-5) ===
    "koi_period",        // 0: Orbital period (days)
    "koi_time0bk",       // 1: Transit epoch (BKJD)
    "koi_impact",        // 2: Impact parameter
    "koi_duration",      // 3: Transit duration (hours)
    "koi_depth",         // 4: Transit depth (ppm)
    "koi_prad",          // 5: Planet radius (Earth radii)

    // === Planet environment (6-9) ===
    "koi_teq",           // 6: Equilibrium temperature (K)
    "koi_insol",         // 7: Insolation flux (Earth flux)
    "koi_model_snr",     // 8: Transit signal-to-noise
    "koi_tce_plnt_num",  // 9: TCE planet number

    // === Host star (10-15) ===
    "koi_steff",         // 10: Stellar effective temperature (K)
    "koi_slogg",         // 11: Stellar surface gravity
    "koi_srad",          // 12: Stellar radius (Solar radii)
    "ra",                // 13: Right ascension (deg)
    "dec",               // 14: Declination (deg)
    "koi_kepmag",        // 15: Kepler magnitude

    // === False positive flags (16-19) ===
    "koi_fpflag_nt",     // 16: Not transit-like
    "koi_fpflag_ss",     // 17: Stellar eclipse
    "koi_fpflag_co",     // 18: Centroid offset
    "koi_fpflag_ec",     // 19: Ephemeris match
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 20;

/// Number of leading continuous features; the rest are 0/1 flags
pub const CONTINUOUS_COUNT: usize = 16;

/// Prefix shared by the catalogue's column names
pub const CATALOG_PREFIX: &str = "koi_";

/// Primitive kind a feature accepts on input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Any JSON number (integers are widened)
    Continuous,
    /// JSON integer, 0 or 1
    Flag,
}

/// Kind of the feature at `index`
pub fn feature_kind(index: usize) -> FeatureKind {
    if index < CONTINUOUS_COUNT {
        FeatureKind::Continuous
    } else {
        FeatureKind::Flag
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered names.
/// Lets clients detect that they were built against another layout.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// FEATURE CATALOGUE
// ============================================================================

/// Human-facing metadata for one feature
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDefinition {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub description: &'static str,
    pub unit: &'static str,
    pub typical_range: &'static str,
    pub importance: &'static str,
}

const fn def(
    name: &'static str,
    kind: FeatureKind,
    description: &'static str,
    unit: &'static str,
    typical_range: &'static str,
    importance: &'static str,
) -> FeatureDefinition {
    FeatureDefinition { name, kind, description, unit, typical_range, importance }
}

use FeatureKind::{Continuous, Flag};

/// Catalogue in layout order
pub static FEATURE_DEFINITIONS: [FeatureDefinition; FEATURE_COUNT] = [
    def("koi_period", Continuous, "Orbital Period (days)", "days", "0.5 - 500", "high"),
    def("koi_time0bk", Continuous, "Transit Epoch (BKJD)", "BKJD", "100 - 2000", "medium"),
    def("koi_impact", Continuous, "Impact Parameter", "dimensionless", "0 - 1", "high"),
    def("koi_duration", Continuous, "Transit Duration (hours)", "hours", "1 - 20", "medium"),
    def("koi_depth", Continuous, "Transit Depth (ppm)", "ppm", "100 - 100000", "high"),
    def("koi_prad", Continuous, "Planet Radius (Earth radii)", "R⊕", "0.5 - 30", "high"),
    def("koi_teq", Continuous, "Equilibrium Temperature (K)", "K", "100 - 3000", "high"),
    def("koi_insol", Continuous, "Insolation Flux (Earth flux)", "F⊕", "0.1 - 1000", "medium"),
    def("koi_model_snr", Continuous, "Transit Signal-to-Noise Ratio", "dimensionless", "5 - 200", "very high"),
    def("koi_tce_plnt_num", Continuous, "TCE Planet Number", "count", "1 - 7", "low"),
    def("koi_steff", Continuous, "Stellar Effective Temperature (K)", "K", "3000 - 8000", "high"),
    def("koi_slogg", Continuous, "Stellar Surface Gravity (log10(cm/s²))", "log10(cm/s²)", "3.5 - 5.0", "medium"),
    def("koi_srad", Continuous, "Stellar Radius (Solar radii)", "R☉", "0.5 - 3.0", "medium"),
    def("ra", Continuous, "Right Ascension (degrees)", "degrees", "0 - 360", "low"),
    def("dec", Continuous, "Declination (degrees)", "degrees", "-90 - 90", "low"),
    def("koi_kepmag", Continuous, "Kepler Magnitude", "mag", "10 - 18", "medium"),
    def("koi_fpflag_nt", Flag, "Not Transit-Like Flag", "binary", "0 - 1", "very high"),
    def("koi_fpflag_ss", Flag, "Stellar Eclipse Flag", "binary", "0 - 1", "very high"),
    def("koi_fpflag_co", Flag, "Centroid Offset Flag", "binary", "0 - 1", "very high"),
    def("koi_fpflag_ec", Flag, "Ephemeris Match Eclipsing Binary Flag", "binary", "0 - 1", "very high"),
];

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout summary served by the schema endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub features: Vec<&'static str>,
    pub count: usize,
    pub version: u8,
    pub layout_hash: String,
    pub definitions: &'static [FeatureDefinition],
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            features: FEATURE_LAYOUT.to_vec(),
            count: FEATURE_COUNT,
            version: FEATURE_VERSION,
            layout_hash: format!("{:08x}", layout_hash()),
            definitions: &FEATURE_DEFINITIONS,
        }
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Check externally supplied column names against the layout.
///
/// LightGBM names unnamed columns `Column_<i>`; those are accepted as long
/// as the count matches.
pub fn names_match_layout<S: AsRef<str>>(names: &[S]) -> bool {
    if names.len() != FEATURE_COUNT {
        return false;
    }

    names.iter().enumerate().all(|(i, name)| {
        let name = name.as_ref();
        name == FEATURE_LAYOUT[i] || name == format!("Column_{}", i)
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 20);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_DEFINITIONS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_definitions_follow_layout() {
        for (i, d) in FEATURE_DEFINITIONS.iter().enumerate() {
            assert_eq!(d.name, FEATURE_LAYOUT[i]);
            assert_eq!(d.kind, feature_kind(i));
        }
    }

    #[test]
    fn test_flags_are_last_four() {
        let flags: Vec<_> = (0..FEATURE_COUNT)
            .filter(|&i| feature_kind(i) == FeatureKind::Flag)
            .map(|i| FEATURE_LAYOUT[i])
            .collect();
        assert_eq!(flags, vec!["koi_fpflag_nt", "koi_fpflag_ss", "koi_fpflag_co", "koi_fpflag_ec"]);
    }

    #[test]
    fn test_layout_hash_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_eq!(LayoutInfo::current().layout_hash.len(), 8);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("koi_period"), Some(0));
        assert_eq!(feature_index("koi_fpflag_ec"), Some(19));
        assert_eq!(feature_index("unknown"), None);
    }

    #[test]
    fn test_names_match_layout() {
        assert!(names_match_layout(FEATURE_LAYOUT));

        let anonymous: Vec<String> = (0..FEATURE_COUNT).map(|i| format!("Column_{}", i)).collect();
        assert!(names_match_layout(&anonymous));

        let mut swapped = FEATURE_LAYOUT.to_vec();
        swapped.swap(0, 1);
        assert!(!names_match_layout(&swapped));
        assert!(!names_match_layout(&FEATURE_LAYOUT[..19]));
    }
}
