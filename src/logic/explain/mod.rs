//! Explain Module - Attribution ranking
//!
//! Turns raw per-feature contributions into the short, human-facing list of
//! reasons returned with every prediction.

pub mod engine;

pub use engine::{rank, readable_name, Direction, Magnitude, TOP_K};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("length mismatch: {names} names, {contributions} contributions, {values} values")]
    LengthMismatch {
        names: usize,
        contributions: usize,
        values: usize,
    },
}

/// Round half away from zero to `places` decimals.
///
/// Not banker's rounding: `0.125` at 2 places gives `0.13`, not `0.12`.
/// Magnitudes too large to scale are returned unchanged; they have no
/// fractional part at that size anyway.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
