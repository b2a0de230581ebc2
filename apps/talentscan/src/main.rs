mod cli;
mod config;
mod documents;
mod errors;
mod llm_client;
mod report;
mod screening;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::cli::Cli;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, TextAnalyzer};
use crate::report::ReportWriter;
use crate::screening::cohort::summarize;
use crate::screening::pipeline::Pipeline;
use crate::screening::profile::parse_profile;
use crate::screening::scorer::AttributeScorer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    dotenvy::dotenv().ok(); // before the filter, so RUST_LOG from .env applies

    // Initialize structured logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = if cli.verbose {
        EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), default_level))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), default_level))
        })
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("screening_run", run_id = %run_id);

    screen(cli, config, run_id).instrument(span).await
}

async fn screen(cli: Cli, config: Config, run_id: String) -> Result<()> {
    info!("=== Starting TalentScan v{} ===", env!("CARGO_PKG_VERSION"));

    if !cli.cv_dir.is_dir() {
        return Err(AppError::DocumentSource(format!(
            "résumé directory not found: {}",
            cli.cv_dir.display()
        ))
        .into());
    }
    if !cli.profile.is_file() {
        return Err(AppError::Config(format!(
            "job profile file not found: {}",
            cli.profile.display()
        ))
        .into());
    }

    // Step 1: Job profile
    let profile_text = std::fs::read_to_string(&cli.profile)
        .with_context(|| format!("Failed to read job profile {}", cli.profile.display()))?;
    let profile = Arc::new(parse_profile(&profile_text));
    info!(
        "Job profile loaded: {} required attributes, {} desired",
        profile.required.len(),
        profile.desired.len()
    );
    if profile.is_empty() {
        warn!("Job profile has no attributes; every candidate will score 0");
    }

    // Step 2: Documents
    info!("Processing résumés in {}", cli.cv_dir.display());
    let documents = documents::read_directory(&cli.cv_dir)?;
    if documents.is_empty() {
        warn!("No supported documents found in {}", cli.cv_dir.display());
        return Ok(());
    }
    info!("Found {} documents to process", documents.len());

    // Step 3: Scoring
    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())
        .context("Failed to build HTTP client")?;
    info!("LLM client initialized (model: {})", config.model);
    let analyzer: Arc<dyn TextAnalyzer> = Arc::new(llm);
    let scorer = AttributeScorer::new(analyzer, config.model_params(), config.max_cv_length);
    let concurrency = cli
        .concurrency
        .map(usize::from)
        .unwrap_or(config.concurrency);
    let pipeline = Pipeline::new(
        scorer,
        config.score_weights(),
        concurrency,
        config.max_candidates,
    );

    let results = pipeline.run(documents, Arc::clone(&profile)).await;
    if results.is_empty() {
        warn!("No candidate was processed successfully");
        return Ok(());
    }

    // Step 4: Cohort statistics and report
    let summary = summarize(&results);
    let stem = cli
        .output
        .unwrap_or_else(|| ReportWriter::default_stem(&config.output_dir, Utc::now()));
    let paths =
        ReportWriter::new(config.score_bands()).write(&stem, &run_id, &profile, &summary)?;

    info!("=== Analysis complete ===");
    info!("Candidates processed: {}", summary.count);
    info!("Average score: {:.2}", summary.average_score);
    if let Some(best) = summary.best() {
        info!(
            "Best candidate: {} - {} points",
            best.display_name(),
            best.total_score
        );
    }
    info!(
        "Report saved to {}, {} and {}",
        paths.analysis.display(),
        paths.summary.display(),
        paths.json.display()
    );

    Ok(())
}
