use std::collections::BTreeMap;

use serde::Serialize;

use crate::screening::analysis::CandidateResult;
use crate::screening::profile::AttributeName;

/// Number of candidates listed in the report's top section.
pub const TOP_N: usize = 5;

/// Cohort-wide statistics. Recomputed from scratch on every run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CohortSummary {
    pub count: usize,
    pub average_score: f64,
    /// Descending by total score; equal scores keep processing order.
    pub top_ranked: Vec<CandidateResult>,
    /// Mean rating per attribute over the candidates that reported it.
    pub per_attribute_average: BTreeMap<AttributeName, f64>,
}

impl CohortSummary {
    pub fn top(&self, n: usize) -> &[CandidateResult] {
        &self.top_ranked[..n.min(self.top_ranked.len())]
    }

    pub fn best(&self) -> Option<&CandidateResult> {
        self.top_ranked.first()
    }
}

pub fn summarize(results: &[CandidateResult]) -> CohortSummary {
    let count = results.len();
    if count == 0 {
        return CohortSummary::default();
    }

    let average_score = results.iter().map(|r| r.total_score).sum::<f64>() / count as f64;

    let mut top_ranked = results.to_vec();
    // `sort_by` is stable, which is what keeps ties in processing order.
    top_ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

    // Summed as f64: unclamped ratings may be arbitrarily large.
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for result in results {
        for (attr, rating) in &result.analysis.scores {
            let entry = totals.entry(attr.as_str()).or_insert((0.0, 0));
            entry.0 += *rating as f64;
            entry.1 += 1;
        }
    }
    let per_attribute_average = totals
        .into_iter()
        .map(|(attr, (sum, n))| (attr.to_string(), sum / n as f64))
        .collect();

    CohortSummary {
        count,
        average_score,
        top_ranked,
        per_attribute_average,
    }
}
