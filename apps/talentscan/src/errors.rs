use thiserror::Error;

/// Application-level error type.
/// Only setup-level failures end up here; per-candidate problems are degraded
/// or skipped inside the screening pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document source error: {0}")]
    DocumentSource(String),

    #[error("Document error ({file}): {message}")]
    Document { file: String, message: String },

    #[error("Report error: {0}")]
    Report(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
