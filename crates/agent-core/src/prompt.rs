//! Prompt Templates
//!
//! Templates use `{name}` placeholders. Every placeholder must be declared as
//! an input variable, and every input variable must be supplied at render
//! time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AgentError, Result};

/// A prompt with named `{variable}` slots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptTemplate {
    input_variables: Vec<String>,
    template: String,
}

impl PromptTemplate {
    /// Create a template, checking that its placeholders match the declared variables
    pub fn new<I, S>(input_variables: I, template: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let input_variables: Vec<String> = input_variables.into_iter().map(Into::into).collect();
        let template = template.into();

        for placeholder in placeholders(&template) {
            if !input_variables.iter().any(|v| v == placeholder) {
                return Err(AgentError::Prompt(format!(
                    "placeholder '{{{placeholder}}}' is not a declared input variable"
                )));
            }
        }

        Ok(Self {
            input_variables,
            template,
        })
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute every declared variable
    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String> {
        let mut rendered = self.template.clone();

        for name in &self.input_variables {
            let value = values.get(name.as_str()).ok_or_else(|| {
                AgentError::Prompt(format!("missing value for '{name}'"))
            })?;
            rendered = rendered.replace(&format!("{{{name}}}"), value);
        }

        tracing::debug!(chars = rendered.len(), "Rendered prompt");
        Ok(rendered)
    }
}

/// Identifiers between single braces, e.g. `trends` in `{trends}`
fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            found.push(name);
        }
        rest = &after[end + 1..];
    }

    found
}
