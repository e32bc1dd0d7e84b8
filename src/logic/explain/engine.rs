use std::cmp::Ordering;

use crate::logic::layout::CATALOG_PREFIX;
use crate::models::Reason;

use super::{round_to, ExplainError};

/// Entries kept in an explanation
pub const TOP_K: usize = 5;

/// |contribution| above this is "strongly"
pub const STRONG_IMPACT: f64 = 0.1;

/// Decimal places for value / shap_value / importance
const PRECISION: i32 = 4;

/// Which way a feature pushed the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increases,
    Decreases,
}

impl Direction {
    /// Exactly zero counts as "decreases"
    pub fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Self::Increases
        } else {
            Self::Decreases
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increases => "increases",
            Self::Decreases => "decreases",
        }
    }
}

/// How hard it pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Strongly,
    Moderately,
}

impl Magnitude {
    pub fn of(contribution: f64) -> Self {
        if contribution.abs() > STRONG_IMPACT {
            Self::Strongly
        } else {
            Self::Moderately
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strongly => "strongly",
            Self::Moderately => "moderately",
        }
    }
}

/// Rank per-feature contributions and keep the `top_k` strongest.
///
/// Ordering is by descending |contribution|; the sort is stable, so equal
/// magnitudes keep the order of `names`.
pub fn rank(
    names: &[&str],
    contributions: &[f64],
    values: &[f64],
    top_k: usize,
) -> Result<Vec<Reason>, ExplainError> {
    if contributions.len() != names.len() || values.len() != names.len() {
        return Err(ExplainError::LengthMismatch {
            names: names.len(),
            contributions: contributions.len(),
            values: values.len(),
        });
    }

    let mut scored: Vec<(&str, f64, f64)> = names
        .iter()
        .zip(contributions)
        .zip(values)
        .map(|((&name, &contribution), &value)| (name, contribution, value))
        .collect();

    scored.sort_by(|a, b| by_magnitude_desc(a.1, b.1));
    scored.truncate(top_k);

    Ok(scored
        .into_iter()
        .map(|(name, contribution, value)| reason(name, contribution, value))
        .collect())
}

fn by_magnitude_desc(a: f64, b: f64) -> Ordering {
    b.abs().total_cmp(&a.abs())
}

fn reason(name: &str, contribution: f64, value: f64) -> Reason {
    let impact = format!(
        "{} {}",
        Magnitude::of(contribution).as_str(),
        Direction::of(contribution).as_str()
    );

    Reason {
        feature: name.to_string(),
        feature_readable: readable_name(name),
        value: round_to(value, PRECISION),
        impact,
        shap_value: round_to(contribution, PRECISION),
        importance: round_to(contribution.abs(), PRECISION),
    }
}

/// `koi_model_snr` → `Model Snr`
pub fn readable_name(name: &str) -> String {
    let stripped = name.strip_prefix(CATALOG_PREFIX).unwrap_or(name);
    title_case(&stripped.replace('_', " "))
}

/// A letter is upper-cased when it starts a word (previous char not a letter)
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
