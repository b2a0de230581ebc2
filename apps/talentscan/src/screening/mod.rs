// Candidate evaluation: profile parsing, attribute scoring, weighted aggregation,
// cohort statistics and the pipeline that sequences them.
// All text-analysis calls go through llm_client::TextAnalyzer.

pub mod aggregate;
pub mod analysis;
pub mod cohort;
pub mod pipeline;
pub mod profile;
pub mod scorer;
