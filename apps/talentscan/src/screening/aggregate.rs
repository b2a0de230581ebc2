//! Score Aggregator — weighted mean of attribute ratings by weight class.
//!
//! total = Σ(rating × weight) / Σ(weight) over profile attributes the analysis rated.
//! Unrated attributes are skipped (not counted as zero) and attributes the
//! scorer invented outside the profile are ignored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::screening::analysis::Analysis;
use crate::screening::profile::JobProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub required: u32,
    pub desired: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            required: 2,
            desired: 1,
        }
    }
}

/// Computes the weighted total for one candidate, rounded to 2 decimals.
/// Returns exactly 0.0 when no profile attribute was rated.
pub fn aggregate(analysis: &Analysis, profile: &JobProfile, weights: &ScoreWeights) -> f64 {
    let weighted = profile
        .required
        .iter()
        .map(|attr| (attr, weights.required))
        .chain(profile.desired.iter().map(|attr| (attr, weights.desired)));

    let mut seen = HashSet::new();
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;

    for (attr, weight) in weighted {
        if !seen.insert(attr.as_str()) {
            continue;
        }
        if let Some(rating) = analysis.scores.get(attr) {
            numerator += *rating as f64 * weight as f64;
            denominator += weight as f64;
        }
    }

    if denominator == 0.0 {
        return 0.0;
    }

    round2(numerator / denominator)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
