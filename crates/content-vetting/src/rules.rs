//! Rule Sets
//!
//! Policy terms, length limits and style keywords live in data, not code.
//! A JSON rules file can override any subset; missing fields keep their
//! defaults.
//!
//! ```json
//! {
//!   "vetting": { "disallowed_terms": ["scam", "rug pull"], "max_length": 280 },
//!   "scoring": { "style_keywords": ["DYOR", "HODL"], "style_threshold": 2 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VettingError};

/// Rules for the accept/reject gate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VettingPolicy {
    /// Terms matched case-insensitively as substrings
    pub disallowed_terms: Vec<String>,

    /// Maximum length in characters
    pub max_length: usize,
}

impl Default for VettingPolicy {
    fn default() -> Self {
        Self {
            disallowed_terms: vec!["scam".into(), "rug pull".into(), "ponzi".into()],
            max_length: 280,
        }
    }
}

/// Points awarded (or deducted) per signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub style: u64,
    pub fact: u64,
    pub sentiment: u64,
    pub engagement: u64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            style: 1,
            fact: 1,
            sentiment: 1,
            engagement: 1,
        }
    }
}

/// Rules for the reward scorer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Phrases matched case-sensitively; every occurrence counts, overlapping ones too
    pub style_keywords: Vec<String>,

    /// Minimum keyword occurrences for the style reward
    pub style_threshold: usize,

    /// Posts longer than this (in characters) never earn the engagement bonus
    pub engagement_max_length: usize,

    pub weights: RewardWeights,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            style_keywords: vec![
                "DYOR".into(),
                "To the moon".into(),
                "HODL".into(),
                "Altseason".into(),
            ],
            style_threshold: 2,
            engagement_max_length: 280,
            weights: RewardWeights::default(),
        }
    }
}

/// Both rule sets, as loaded from a rules file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub vetting: VettingPolicy,
    pub scoring: ScoringRules,
}

impl RuleSet {
    /// Parse and validate a JSON rule set
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            disallowed_terms = rules.vetting.disallowed_terms.len(),
            style_keywords = rules.scoring.style_keywords.len(),
            "Loaded rule set"
        );
        Ok(rules)
    }

    /// Load from `VETTING_RULES_PATH`, or use the built-in defaults if unset
    pub fn from_env() -> Result<Self> {
        match std::env::var("VETTING_RULES_PATH") {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.vetting.disallowed_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(VettingError::Config(
                "disallowed_terms must not contain empty terms".into(),
            ));
        }
        if self.scoring.style_keywords.iter().any(String::is_empty) {
            return Err(VettingError::Config(
                "style_keywords must not contain empty keywords".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = RuleSet::default();
        assert_eq!(rules.vetting.max_length, 280);
        assert_eq!(rules.vetting.disallowed_terms, vec!["scam", "rug pull", "ponzi"]);
        assert_eq!(rules.scoring.style_threshold, 2);
        assert_eq!(rules.scoring.weights, RewardWeights::default());
    }

    #[test]
    fn test_partial_override() {
        let rules = RuleSet::from_json(r#"{"vetting": {"max_length": 140}}"#).unwrap();
        assert_eq!(rules.vetting.max_length, 140);
        assert_eq!(rules.vetting.disallowed_terms.len(), 3);
        assert_eq!(rules.scoring, ScoringRules::default());
    }

    #[test]
    fn test_empty_term_rejected() {
        let err = RuleSet::from_json(r#"{"vetting": {"disallowed_terms": ["scam", " "]}}"#).unwrap_err();
        assert!(matches!(err, VettingError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuleSet::load("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, VettingError::Io(_)));
    }
}
