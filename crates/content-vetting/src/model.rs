//! Domain Models
//!
//! Candidates and the verdicts produced for them. Both are immutable once
//! built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One generated post awaiting vetting and scoring
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique id, used to correlate logs and metrics records
    pub id: Uuid,

    /// Generated post text
    pub text: String,

    /// Trends the prompt was built from, in prompt order
    pub source_trends: Vec<String>,

    /// Retrieved context snippets, in rank order
    pub context_snippets: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl Candidate {
    pub fn new(
        text: impl Into<String>,
        source_trends: Vec<String>,
        context_snippets: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source_trends,
            context_snippets,
            created_at: Utc::now(),
        }
    }

    /// Candidate with no trend or retrieval provenance
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new(), Vec::new())
    }

    /// Length as the platforms count it (characters, not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Accept/reject verdict with a human-readable cause
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VettingResult {
    pub accepted: bool,
    pub reason: String,
}

impl VettingResult {
    pub fn approved() -> Self {
        Self {
            accepted: true,
            reason: "Content approved.".into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_characters() {
        let candidate = Candidate::from_text("🚀🚀 moon");
        assert_eq!(candidate.char_len(), 7);
        assert!(candidate.text.len() > 7);
    }

    #[test]
    fn test_candidate_ids_unique() {
        let a = Candidate::from_text("x");
        let b = Candidate::from_text("x");
        assert_ne!(a.id, b.id);
    }
}
