//! Post Generator
//!
//! Renders the persona prompt from trends and retrieved context, then asks
//! the configured `LlmProvider` for a single draft.

use std::collections::HashMap;
use std::sync::Arc;

use agent_core::{AgentError, GenerationOptions, LlmProvider, Message, PromptTemplate};

use crate::error::Result;

/// Default prompt; `{persona}`, `{trends}` and `{rag_context}` are filled per cycle
pub const POST_PROMPT: &str = r"You are a virtual version of {persona}. Generate social media content using their style.

Recent crypto trends: {trends}
Relevant context from past content: {rag_context}

Generate a post that:
1. Matches {persona}'s communication style
2. Incorporates at least 2 trends
3. Includes characteristic phrases (e.g., 'DYOR', 'To the moon!')
4. Is under 280 characters";

pub struct PostGenerator {
    provider: Arc<dyn LlmProvider>,
    template: PromptTemplate,
    persona: String,
    options: GenerationOptions,
}

impl PostGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        persona: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<Self> {
        let template = PromptTemplate::new(["persona", "trends", "rag_context"], POST_PROMPT)?;
        Ok(Self::with_template(provider, template, persona, options))
    }

    pub fn with_template(
        provider: Arc<dyn LlmProvider>,
        template: PromptTemplate,
        persona: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            template,
            persona: persona.into(),
            options,
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn render_prompt(&self, trends: &[String], context: &[String]) -> Result<String> {
        let mut values = HashMap::new();
        values.insert("persona", self.persona.clone());
        values.insert("trends", trends.join(", "));
        values.insert("rag_context", context.join("\n---\n"));
        Ok(self.template.render(&values)?)
    }

    /// One trimmed draft; an empty completion is an error
    pub async fn generate(&self, trends: &[String], context: &[String]) -> Result<String> {
        let prompt = self.render_prompt(trends, context)?;
        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await?;

        let text = completion.content.trim();
        if text.is_empty() {
            return Err(AgentError::Parse("model returned an empty post".into()).into());
        }

        tracing::debug!(
            provider = self.provider.name(),
            model = %completion.model,
            chars = text.chars().count(),
            "Generated draft"
        );
        Ok(text.to_string())
    }
}
