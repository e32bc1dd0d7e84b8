//! Response Assembler
//!
//! Percentages are rounded to 2 decimals independently, so
//! `probability_planet + probability_false_positive` may be off 100 by one
//! rounding unit. That is left as is.

use thiserror::Error;

use crate::logic::explain::round_to;
use crate::models::{ClassLabel, PredictionResult, Reason};

#[derive(Debug, Error, PartialEq)]
pub enum AssembleError {
    #[error("unknown class index {0}, scorer is binary")]
    UnknownClass(usize),

    #[error("non-finite class probabilities [{0}, {1}]")]
    NonFinite(f64, f64),
}

/// Build the response for one prediction
pub fn assemble(
    class_index: usize,
    probabilities: [f64; 2],
    top_reasons: Vec<Reason>,
) -> Result<PredictionResult, AssembleError> {
    let prediction = ClassLabel::from_index(class_index)
        .ok_or(AssembleError::UnknownClass(class_index))?;

    let [p_false_positive, p_planet] = probabilities;
    if !p_false_positive.is_finite() || !p_planet.is_finite() {
        return Err(AssembleError::NonFinite(p_false_positive, p_planet));
    }

    Ok(PredictionResult {
        prediction,
        confidence: percent(p_false_positive.max(p_planet)),
        probability_planet: percent(p_planet),
        probability_false_positive: percent(p_false_positive),
        top_reasons,
    })
}

fn percent(p: f64) -> f64 {
    round_to(p * 100.0, 2)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_percentages_consistent(p in 0.0f64..=1.0) {
            let class_index = if p > 1.0 - p { 1 } else { 0 };
            let result = assemble(class_index, [1.0 - p, p], vec![]).unwrap();

            let sum = result.probability_planet + result.probability_false_positive;
            prop_assert!((sum - 100.0).abs() <= 0.02 + 1e-9);
            prop_assert_eq!(
                result.confidence,
                result.probability_planet.max(result.probability_false_positive)
            );
            prop_assert!((0.0..=100.0).contains(&result.confidence));
        }
    }
}
