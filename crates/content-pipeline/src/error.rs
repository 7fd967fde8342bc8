//! Error Types for the Content Pipeline
//!
//! Every error here aborts the current cycle only; the agent loop logs it and
//! waits for the next tick.

use agent_core::AgentError;
use content_vetting::VettingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Trend fetch failed: {0}")]
    TrendFetch(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] AgentError),

    #[error("Publish failed on {sink}: {message}")]
    Publish { sink: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vetting setup failed: {0}")]
    Vetting(#[from] VettingError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Short stage label for logs and HTTP error codes
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::TrendFetch(_) | Self::Network(_) => "trends",
            Self::Retrieval(_) => "retrieval",
            Self::Generation(_) => "generation",
            Self::Publish { .. } => "publish",
            Self::Config(_) | Self::Vetting(_) => "config",
            Self::Io(_) | Self::Serialization(_) => "storage",
        }
    }

    /// Whether the next cycle has a fair chance of succeeding unchanged
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Generation(e) => e.is_retryable(),
            Self::TrendFetch(_) | Self::Network(_) | Self::Publish { .. } => true,
            _ => false,
        }
    }

    /// Message safe to return to HTTP clients
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_retry() {
        let err = PipelineError::Generation(AgentError::RateLimited("429".into()));
        assert_eq!(err.stage(), "generation");
        assert!(err.is_retryable());

        let err = PipelineError::Config("missing".into());
        assert_eq!(err.stage(), "config");
        assert!(!err.is_retryable());
    }
}
