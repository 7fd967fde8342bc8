//! Local inference through an Ollama server
//!
//! The persona prompt goes out as a single user turn, the same text the
//! hosted backend receives. A failed request is classified by asking the
//! server for its model list: if that fails too the server is down and the
//! next cycle may succeed, otherwise the request itself was rejected.

use agent_core::{
    error::{AgentError, Result},
    message::{self, Message},
    provider::{Completion, GenerationOptions, LlmProvider},
};
use async_trait::async_trait;
use ollama_rs::{
    generation::{
        chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
    },
    models::ModelOptions as OllamaOptions,
    Ollama,
};

const DEFAULT_HOST: &str = "http://localhost";
const DEFAULT_PORT: u16 = 11434;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl OllamaConfig {
    /// `OLLAMA_HOST` and `OLLAMA_PORT`; an unparsable port falls back to the default
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_HOST.into()),
            port: std::env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

pub struct OllamaProvider {
    client: Ollama,
}

impl OllamaProvider {
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            client: Ollama::new(config.host.as_str(), config.port),
        }
    }

    pub fn from_env() -> Self {
        Self::from_config(&OllamaConfig::from_env())
    }

    /// Collapse the conversation into one user turn
    fn post_request(messages: &[Message], opts: &GenerationOptions) -> ChatMessageRequest {
        let prompt = message::flatten(messages);
        let options = OllamaOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX));

        ChatMessageRequest::new(
            opts.model.clone(),
            vec![ChatMessage::new(MessageRole::User, prompt)],
        )
        .options(options)
    }

    async fn reachable(&self) -> bool {
        self.client.list_local_models().await.is_ok()
    }

    async fn classify_failure(&self, detail: String) -> AgentError {
        if self.reachable().await {
            AgentError::Provider(detail)
        } else {
            AgentError::ProviderUnavailable(detail)
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn health_check(&self) -> Result<bool> {
        let reachable = self.reachable().await;
        if !reachable {
            tracing::warn!("Ollama server did not answer the model list request");
        }
        Ok(reachable)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::post_request(messages, options);

        let response = match self.client.send_chat_messages(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.classify_failure(e.to_string()).await),
        };

        Ok(Completion {
            content: response.message.content,
            model: options.model.clone(),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        assert_eq!(
            OllamaConfig::default(),
            OllamaConfig {
                host: "http://localhost".into(),
                port: 11434,
            }
        );
    }

    #[tokio::test]
    async fn test_server_down_is_retryable() {
        let provider = OllamaProvider::from_config(&OllamaConfig {
            host: "http://127.0.0.1".into(),
            port: 9,
        });

        assert!(!provider.health_check().await.unwrap());

        let err = provider
            .complete(
                &[Message::system("Crypto Banter"), Message::user("Write a post")],
                &GenerationOptions {
                    model: "llama3.2".into(),
                    ..GenerationOptions::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
        assert!(err.is_retryable());
    }
}
