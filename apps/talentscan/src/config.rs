use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::errors::AppError;
use crate::llm_client::ModelParams;
use crate::screening::aggregate::ScoreWeights;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or out of range.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_cv_length: usize,
    pub max_candidates: usize,
    pub required_weight: u32,
    pub desired_weight: u32,
    pub good_score_threshold: f64,
    pub medium_score_threshold: f64,
    pub concurrency: usize,
    pub output_dir: PathBuf,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before calling this.
    pub fn from_env() -> Result<Self> {
        let config = Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("OPENAI_MODEL", "gpt-3.5-turbo"),
            max_tokens: parse_env("OPENAI_MAX_TOKENS", 1000)?,
            temperature: parse_env("OPENAI_TEMPERATURE", 0.3)?,
            max_cv_length: parse_env("MAX_CV_LENGTH", 3000)?,
            max_candidates: parse_env("MAX_CANDIDATES", 100)?,
            required_weight: parse_env("REQUIRED_WEIGHT", 2)?,
            desired_weight: parse_env("DESIRED_WEIGHT", 1)?,
            good_score_threshold: parse_env("GOOD_SCORE_THRESHOLD", 4.0)?,
            medium_score_threshold: parse_env("MEDIUM_SCORE_THRESHOLD", 3.0)?,
            concurrency: parse_env("SCREENING_CONCURRENCY", 1)?,
            output_dir: PathBuf::from(env_or("DEFAULT_OUTPUT_DIR", "relatorios")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges, reporting every violation at once.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();

        if self.openai_api_key.trim().is_empty() {
            errors.push("OPENAI_API_KEY must not be empty".to_string());
        }
        if self.max_tokens < 100 {
            errors.push("OPENAI_MAX_TOKENS must be at least 100".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push("OPENAI_TEMPERATURE must be between 0 and 2".to_string());
        }
        if self.max_cv_length < 500 {
            errors.push("MAX_CV_LENGTH must be at least 500".to_string());
        }
        if self.max_candidates == 0 {
            errors.push("MAX_CANDIDATES must be at least 1".to_string());
        }
        if self.required_weight == 0 || self.desired_weight == 0 {
            errors.push("REQUIRED_WEIGHT and DESIRED_WEIGHT must be at least 1".to_string());
        }
        if self.medium_score_threshold > self.good_score_threshold {
            errors.push(
                "MEDIUM_SCORE_THRESHOLD must not exceed GOOD_SCORE_THRESHOLD".to_string(),
            );
        }
        if self.concurrency == 0 {
            errors.push("SCREENING_CONCURRENCY must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(errors.join("; ")))
        }
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn score_weights(&self) -> ScoreWeights {
        ScoreWeights {
            required: self.required_weight,
            desired: self.desired_weight,
        }
    }

    pub fn score_bands(&self) -> ScoreBands {
        ScoreBands {
            good: self.good_score_threshold,
            medium: self.medium_score_threshold,
        }
    }
}

/// Rating-to-band thresholds. Consumed only by the report renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBands {
    pub good: f64,
    pub medium: f64,
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            good: 4.0,
            medium: 3.0,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
