use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::documents::ContactInfo;
use crate::screening::profile::AttributeName;

/// Integer score for one attribute of one candidate. Nominally 1–5, but values
/// reported by the scorer's primary tier are passed through unclamped.
pub type Rating = i64;

/// Which degradation tier produced an `Analysis`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringTier {
    /// The reply parsed cleanly as the expected schema.
    #[default]
    Primary,
    /// The reply was malformed; ratings were recovered by pattern search.
    RegexFallback,
    /// The text-analysis call failed; every attribute defaulted to 1.
    Default,
}

impl ScoringTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringTier::Primary => "primary",
            ScoringTier::RegexFallback => "regex_fallback",
            ScoringTier::Default => "default",
        }
    }
}

/// Per-attribute ratings plus a narrative summary for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(rename = "pontuacoes")]
    pub scores: BTreeMap<AttributeName, Rating>,
    #[serde(rename = "resumo")]
    pub summary: String,
    #[serde(default)]
    pub tier: ScoringTier,
}

/// Outcome of screening one candidate. Written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub contact: ContactInfo,
    pub source_file: String,
    pub analysis: Analysis,
    pub total_score: f64,
}

impl CandidateResult {
    /// Display name for logs and reports.
    pub fn display_name(&self) -> &str {
        self.contact.name.as_deref().unwrap_or(&self.source_file)
    }
}
