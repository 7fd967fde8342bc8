//! Reward Scoring
//!
//! Four signals per candidate, each worth one weighted unit:
//!
//! | Signal     | Pass                                  | Fail      |
//! |------------|---------------------------------------|-----------|
//! | style      | keyword occurrences >= threshold      | penalty   |
//! | fact       | `FactChecker` says true               | penalty   |
//! | sentiment  | `SentimentAnalyzer` says true         | penalty   |
//! | engagement | short enough and contains `?`         | (nothing) |
//!
//! Capability calls are bounded by a timeout. An error or timeout counts as
//! a failed signal and is logged, never propagated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VettingError};
use crate::fact_check::FactChecker;
use crate::rules::ScoringRules;
use crate::sentiment::SentimentAnalyzer;

const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Running reward/penalty counters, threaded explicitly through evaluations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTotals {
    pub reward: u64,
    pub penalty: u64,
}

impl RewardTotals {
    pub const fn new(reward: u64, penalty: u64) -> Self {
        Self { reward, penalty }
    }

    /// `reward - penalty`
    pub fn net(self) -> i64 {
        to_i64(self.reward).saturating_sub(to_i64(self.penalty))
    }

    /// Add another set of counters (e.g. a per-call delta) to these
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            reward: self.reward.saturating_add(other.reward),
            penalty: self.penalty.saturating_add(other.penalty),
        }
    }

    const fn credit(&mut self, weight: u64) {
        self.reward = self.reward.saturating_add(weight);
    }

    const fn debit(&mut self, weight: u64) {
        self.penalty = self.penalty.saturating_add(weight);
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Per-signal outcome for one candidate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Style keyword occurrences found
    pub style_score: usize,
    pub fact_score: bool,
    pub sentiment_score: bool,
    /// Engagement points awarded (zero when not earned)
    pub engagement_bonus: u64,
    /// Weighted sum for this candidate: passes add, failures subtract
    pub total: i64,
}

/// Result of scoring one candidate against a running total
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub breakdown: RewardBreakdown,
    /// Counters contributed by this candidate alone
    pub delta: RewardTotals,
    /// Counters after this candidate
    pub totals: RewardTotals,
}

impl Evaluation {
    /// Cumulative net score after this candidate
    pub fn score(&self) -> i64 {
        self.totals.net()
    }
}

/// Stateless scorer; share it freely and keep totals wherever they belong
pub struct RewardScorer {
    rules: ScoringRules,
    fact_checker: Arc<dyn FactChecker>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    signal_timeout: Duration,
}

impl RewardScorer {
    pub fn new(
        rules: ScoringRules,
        fact_checker: Arc<dyn FactChecker>,
        sentiment: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            rules,
            fact_checker,
            sentiment,
            signal_timeout: DEFAULT_SIGNAL_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_signal_timeout(mut self, timeout: Duration) -> Self {
        self.signal_timeout = timeout;
        self
    }

    pub const fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Total occurrences of every style keyword (case-sensitive, overlaps count)
    pub fn style_score(&self, text: &str) -> usize {
        self.rules
            .style_keywords
            .iter()
            .filter(|kw| !kw.is_empty())
            .map(|kw| count_overlapping(text, kw))
            .sum()
    }

    /// Engagement points for short posts that ask a question
    pub fn engagement_bonus(&self, text: &str) -> u64 {
        if text.chars().count() <= self.rules.engagement_max_length && text.contains('?') {
            self.rules.weights.engagement
        } else {
            0
        }
    }

    /// Score one candidate, returning its breakdown and its own counters
    pub async fn score(&self, text: &str) -> (RewardBreakdown, RewardTotals) {
        let weights = self.rules.weights;
        let mut delta = RewardTotals::default();

        let style_score = self.style_score(text);
        let style_pass = style_score >= self.rules.style_threshold;
        apply(&mut delta, style_pass, weights.style);

        let fact_score = guarded(
            "fact_check",
            self.signal_timeout,
            self.fact_checker.check_facts(text),
        )
        .await;
        apply(&mut delta, fact_score, weights.fact);

        let sentiment_score = guarded(
            "sentiment",
            self.signal_timeout,
            self.sentiment.analyze_sentiment(text),
        )
        .await;
        apply(&mut delta, sentiment_score, weights.sentiment);

        let engagement_bonus = self.engagement_bonus(text);
        delta.credit(engagement_bonus);

        tracing::debug!(
            style_score,
            style_pass,
            fact_score,
            sentiment_score,
            engagement_bonus,
            "Scored candidate"
        );

        let breakdown = RewardBreakdown {
            style_score,
            fact_score,
            sentiment_score,
            engagement_bonus,
            total: delta.net(),
        };

        (breakdown, delta)
    }

    /// Score one candidate and fold it into `totals`
    pub async fn evaluate(&self, text: &str, totals: RewardTotals) -> Evaluation {
        let (breakdown, delta) = self.score(text).await;
        Evaluation {
            breakdown,
            delta,
            totals: totals.combine(delta),
        }
    }
}

/// Occurrences of `needle` in `haystack`, overlapping ones included
fn count_overlapping(haystack: &str, needle: &str) -> usize {
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let at = start + pos;
        count += 1;
        start = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    count
}

const fn apply(totals: &mut RewardTotals, passed: bool, weight: u64) {
    if passed {
        totals.credit(weight);
    } else {
        totals.debit(weight);
    }
}

/// Await a capability call under `timeout`; failures read as `false`
async fn guarded<F>(signal: &'static str, timeout: Duration, call: F) -> bool
where
    F: Future<Output = Result<bool>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(passed)) => passed,
        Ok(Err(e)) => {
            tracing::warn!(signal, error = %e, "Signal unavailable, counting as penalty");
            false
        }
        Err(_) => {
            let e = VettingError::Timeout {
                signal,
                secs: timeout.as_secs(),
            };
            tracing::warn!(signal, error = %e, "Signal unavailable, counting as penalty");
            false
        }
    }
}

/// A scorer paired with its running totals.
///
/// `evaluate_content` returns the net score across every call made on this
/// instance, not just the latest candidate.
pub struct RewardSystem {
    scorer: RewardScorer,
    totals: RewardTotals,
}

impl RewardSystem {
    pub fn new(scorer: RewardScorer) -> Self {
        Self {
            scorer,
            totals: RewardTotals::default(),
        }
    }

    pub async fn evaluate(&mut self, text: &str) -> Evaluation {
        let evaluation = self.scorer.evaluate(text, self.totals).await;
        self.totals = evaluation.totals;
        evaluation
    }

    /// Cumulative `reward - penalty` after scoring `text`
    pub async fn evaluate_content(&mut self, text: &str) -> i64 {
        self.evaluate(text).await.score()
    }

    pub const fn totals(&self) -> RewardTotals {
        self.totals
    }

    pub const fn reward(&self) -> u64 {
        self.totals.reward
    }

    pub const fn penalty(&self) -> u64 {
        self.totals.penalty
    }
}
