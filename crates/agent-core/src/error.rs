//! Error Types

use thiserror::Error;

/// Result type alias for provider and prompt operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or still loading the model
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Prompt template could not be rendered
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Provider returned a body we could not interpret
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable on the next cycle
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_)
        )
    }

    /// Convert to a message safe to return to HTTP clients
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The text generation service returned an error: {msg}"),
            Self::ProviderUnavailable(_) => "The text generation service is currently unavailable.".into(),
            Self::RateLimited(_) => "The text generation service is rate limiting requests.".into(),
            Self::Auth(_) => "Authentication with the text generation service failed.".into(),
            Self::Prompt(msg) => format!("Prompt could not be built: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
