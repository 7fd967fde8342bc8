//! # content-vetting
//!
//! Gatekeeping and reward scoring for generated social posts.
//!
//! ## Two gates, one candidate
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Candidate text                                               │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ContentVetter   policy terms ──▶ length      → accept/reject │
//! │  RewardScorer    style │ facts │ sentiment │ engagement       │
//! │                     ▼      ▼         ▼            ▼           │
//! │                  RewardTotals { reward, penalty }  → net      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The vetter is a pure function of the text and a [`VettingPolicy`]. The
//! scorer is stateless: the running totals are a plain [`RewardTotals`] value
//! the caller threads through each [`RewardScorer::evaluate`] call.
//! [`RewardSystem`] bundles a scorer with its totals for callers that only
//! want the cumulative net score.

pub mod error;
pub mod fact_check;
pub mod model;
pub mod reward;
pub mod rules;
pub mod sentiment;
pub mod vetting;

pub use error::{Result, VettingError};
pub use fact_check::{CoinGeckoFactChecker, FactChecker, KnownEntityChecker};
pub use model::{Candidate, VettingResult};
pub use reward::{Evaluation, RewardBreakdown, RewardScorer, RewardSystem, RewardTotals};
pub use rules::{RewardWeights, RuleSet, ScoringRules, VettingPolicy};
pub use sentiment::{LexiconSentimentAnalyzer, SentimentAnalyzer};
pub use vetting::ContentVetter;
