use crate::types::Timeframe;
use thiserror::Error;

/// Per-instrument analysis errors. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient {timeframe} data: need {required} bars, got {actual}")]
    InsufficientData {
        timeframe: Timeframe,
        required: usize,
        actual: usize,
    },

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Alert delivery error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
