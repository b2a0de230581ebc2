//! Screening pipeline — scores every candidate document and aggregates the totals.
//!
//! Flow per candidate: AttributeScorer → ScoreAggregator → CandidateResult.
//!
//! Each candidate runs as its own tokio task, gated by a semaphore. Handles are
//! awaited in input order, so the output keeps the original relative order no
//! matter which task finishes first. A failing or panicking candidate is logged
//! and dropped; the rest of the batch continues.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::documents::CandidateDocument;
use crate::errors::AppError;
use crate::screening::aggregate::{aggregate, ScoreWeights};
use crate::screening::analysis::CandidateResult;
use crate::screening::profile::JobProfile;
use crate::screening::scorer::AttributeScorer;

#[derive(Clone)]
pub struct Pipeline {
    scorer: AttributeScorer,
    weights: ScoreWeights,
    concurrency: usize,
    max_candidates: usize,
}

impl Pipeline {
    pub fn new(
        scorer: AttributeScorer,
        weights: ScoreWeights,
        concurrency: usize,
        max_candidates: usize,
    ) -> Self {
        Self {
            scorer,
            weights,
            concurrency: concurrency.max(1),
            max_candidates,
        }
    }

    /// Runs the batch. The result holds only successfully screened candidates,
    /// in input order.
    pub async fn run(
        &self,
        mut documents: Vec<CandidateDocument>,
        profile: Arc<JobProfile>,
    ) -> Vec<CandidateResult> {
        if documents.len() > self.max_candidates {
            warn!(
                "{} documents found, only the first {} will be screened",
                documents.len(),
                self.max_candidates
            );
            documents.truncate(self.max_candidates);
        }

        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        for (index, document) in documents.into_iter().enumerate() {
            // Taking the permit before spawning keeps start order equal to input order.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Screening semaphore closed: {e}");
                    break;
                }
            };
            let source_file = document.source_file.clone();
            let scorer = self.scorer.clone();
            let weights = self.weights;
            let profile = Arc::clone(&profile);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                info!(
                    "Analyzing candidate {}/{}: {}",
                    index + 1,
                    total,
                    document.source_file
                );
                evaluate_candidate(&scorer, &weights, &profile, document).await
            });
            handles.push((index, source_file, handle));
        }

        let mut results = Vec::with_capacity(total);
        for (index, source_file, handle) in handles {
            match handle.await {
                Ok(Ok(result)) => {
                    info!(
                        "Candidate {} processed - score: {} (tier: {})",
                        index + 1,
                        result.total_score,
                        result.analysis.tier.as_str()
                    );
                    results.push(result);
                }
                Ok(Err(e)) => {
                    error!("Error processing candidate {} ({source_file}): {e}", index + 1);
                }
                Err(e) => {
                    error!(
                        "Candidate {} ({source_file}) aborted unexpectedly: {e}",
                        index + 1
                    );
                }
            }
        }

        results
    }
}

async fn evaluate_candidate(
    scorer: &AttributeScorer,
    weights: &ScoreWeights,
    profile: &JobProfile,
    document: CandidateDocument,
) -> Result<CandidateResult, AppError> {
    if document.text.trim().is_empty() {
        warn!(
            "{} has no extractable text; scoring it anyway",
            document.source_file
        );
    }

    let analysis = scorer.score(&document.text, profile).await;
    let total_score = checked_total(
        aggregate(&analysis, profile, weights),
        &document.source_file,
    )?;

    Ok(CandidateResult {
        contact: document.contact,
        source_file: document.source_file,
        analysis,
        total_score,
    })
}

fn checked_total(total: f64, source_file: &str) -> Result<f64, AppError> {
    if total.is_finite() {
        Ok(total)
    } else {
        Err(AppError::Document {
            file: source_file.to_string(),
            message: format!("aggregate score is not finite ({total})"),
        })
    }
}
