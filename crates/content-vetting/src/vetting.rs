//! Content Vetter
//!
//! Deterministic publication gate. Rules run in order and the first failure
//! decides the reason:
//!
//! 1. policy: no disallowed term, case-insensitive
//! 2. length: at most `max_length` characters

use crate::model::VettingResult;
use crate::rules::VettingPolicy;

pub const INAPPROPRIATE_REASON: &str = "Content contains inappropriate language.";

#[derive(Clone, Debug)]
pub struct ContentVetter {
    /// Lowercased once at construction
    disallowed_terms: Vec<String>,
    max_length: usize,
}

impl Default for ContentVetter {
    fn default() -> Self {
        Self::new(&VettingPolicy::default())
    }
}

impl ContentVetter {
    pub fn new(policy: &VettingPolicy) -> Self {
        Self {
            disallowed_terms: policy
                .disallowed_terms
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            max_length: policy.max_length,
        }
    }

    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn vet(&self, text: &str) -> VettingResult {
        let lowered = text.to_lowercase();
        if let Some(term) = self.disallowed_terms.iter().find(|t| lowered.contains(t.as_str())) {
            tracing::debug!(term = %term, "Vetting rejected: policy term");
            return VettingResult::rejected(INAPPROPRIATE_REASON);
        }

        let length = text.chars().count();
        if length > self.max_length {
            tracing::debug!(length, max = self.max_length, "Vetting rejected: too long");
            return VettingResult::rejected(format!(
                "Content exceeds {} characters.",
                self.max_length
            ));
        }

        VettingResult::approved()
    }
}
