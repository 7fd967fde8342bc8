//! Error Types for Content Vetting

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VettingError>;

#[derive(Error, Debug)]
pub enum VettingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reference data unavailable: {0}")]
    ReferenceUnavailable(String),

    #[error("Market data API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{signal} timed out after {secs}s")]
    Timeout { signal: &'static str, secs: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
