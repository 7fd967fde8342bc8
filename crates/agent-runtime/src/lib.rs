//! # agent-runtime
//!
//! Text generation providers for the trend post agent.
//!
//! ## Providers
//!
//! - **Hugging Face** (default): hosted inference API
//! - **Ollama**: local inference via Ollama (feature `ollama`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::ProviderKind;
//!
//! let provider = agent_runtime::provider_from_env(ProviderKind::from_env()?)?;
//! let completion = provider.complete(&messages, &options).await?;
//! ```

pub mod huggingface;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use huggingface::{HuggingFaceConfig, HuggingFaceProvider};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

use std::sync::Arc;

pub use agent_core::{AgentError, Completion, GenerationOptions, LlmProvider, Message, Result, Role};

/// Which backend to build from the environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    HuggingFace,
    Ollama,
}

impl ProviderKind {
    /// Model used when `LLM_MODEL` is unset
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
            Self::Ollama => "llama3.2",
        }
    }

    pub fn from_env() -> Result<Self> {
        std::env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "huggingface".into())
            .parse()
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            other => Err(AgentError::Config(format!("unknown LLM_PROVIDER '{other}'"))),
        }
    }
}

/// Build the provider for `kind`, reading its settings from the environment
pub fn provider_from_env(kind: ProviderKind) -> Result<Arc<dyn LlmProvider>> {
    match kind {
        ProviderKind::HuggingFace => Ok(Arc::new(HuggingFaceProvider::from_env()?)),
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::from_env())),
        #[cfg(not(feature = "ollama"))]
        ProviderKind::Ollama => Err(AgentError::Config(
            "LLM_PROVIDER=ollama but the `ollama` feature is disabled".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("HF".parse::<ProviderKind>().unwrap(), ProviderKind::HuggingFace);
        assert_eq!(" ollama ".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("openai".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Ollama.default_model(), "llama3.2");
    }
}
