//! # agent-core
//!
//! Provider-agnostic LLM abstraction used by the trend post agent.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Post generation                          │
//! │  ┌──────────────────┐        ┌────────────────────────────┐  │
//! │  │  PromptTemplate  │──────▶ │   LlmProvider (Strategy)   │  │
//! │  │  {trends} {ctx}  │        │   HuggingFace | Ollama     │  │
//! │  └──────────────────┘        └────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the pipeline swap between a hosted inference
//! endpoint and a local model without touching generation logic.

pub mod error;
pub mod message;
pub mod prompt;
pub mod provider;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use prompt::PromptTemplate;
pub use provider::{Completion, GenerationOptions, LlmProvider};
