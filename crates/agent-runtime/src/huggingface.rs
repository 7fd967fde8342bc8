//! Hugging Face Inference Provider
//!
//! Implementation of `LlmProvider` for the hosted text-generation endpoint.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{self, Message},
    provider::{Completion, GenerationOptions, LlmProvider},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.3";

/// Hugging Face provider configuration
#[derive(Clone, Debug)]
pub struct HuggingFaceConfig {
    /// Full model endpoint URL
    pub model_url: String,

    /// Bearer token
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HuggingFaceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.into(),
            api_key: api_key.into(),
            timeout_secs: 120,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("HUGGINGFACE_API_KEY")
            .map_err(|_| AgentError::Config("HUGGINGFACE_API_KEY is not set".into()))?;
        let model_url = std::env::var("HUGGINGFACE_MODEL_URL")
            .unwrap_or_else(|_| DEFAULT_MODEL_URL.into());
        let timeout_secs = std::env::var("HUGGINGFACE_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            model_url,
            api_key,
            timeout_secs,
        })
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Hosted inference provider
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    pub fn from_config(config: HuggingFaceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(HuggingFaceConfig::from_env()?)
    }

    fn build_request<'a>(prompt: &'a str, opts: &GenerationOptions) -> InferenceRequest<'a> {
        InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: opts.max_tokens,
                temperature: opts.temperature,
                top_p: opts.top_p,
                return_full_text: opts.return_full_text,
            },
        }
    }

    /// Map a non-success status to the matching error variant
    fn status_error(status: StatusCode, body: String) -> AgentError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(body),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(body),
            StatusCode::SERVICE_UNAVAILABLE => AgentError::ProviderUnavailable(body),
            _ => AgentError::Provider(format!("{status}: {body}")),
        }
    }

    fn parse_body(body: &str) -> Result<String> {
        let outputs: Vec<GeneratedText> = serde_json::from_str(body)
            .map_err(|e| AgentError::Parse(format!("unexpected inference response: {e}")))?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.generated_text)
            .ok_or_else(|| AgentError::Parse("inference response contained no generations".into()))
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .client
            .get(&self.config.model_url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::warn!("Hugging Face health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let prompt = message::flatten(messages);
        let request = Self::build_request(&prompt, options);

        let resp = self
            .client
            .post(&self.config.model_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, body));
        }

        Ok(Completion {
            content: Self::parse_body(&body)?,
            model: options.model.clone(),
            usage: None,
        })
    }
}
