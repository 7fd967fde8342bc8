//! Application State

use std::sync::Arc;

use agent_core::LlmProvider;
use content_pipeline::ContentPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Text generation backend (Hugging Face, Ollama)
    pub provider: Arc<dyn LlmProvider>,

    /// The cycle shared by the HTTP endpoints and the polling loop
    pub pipeline: Arc<ContentPipeline>,
}
