//! Word-list sentiment with negation handling.
//!
//! Each positive word scores +1 and each negative word -1, flipped when a
//! negation word appears within `NEGATION_WINDOW` tokens before it. Polarity
//! is the score divided by the token count, so it stays in [-1, 1].

use std::collections::HashSet;

use async_trait::async_trait;

use super::SentimentAnalyzer;
use crate::error::Result;

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "gains", "profit", "growth", "strong",
    "positive", "rise", "rising", "breakout", "breakthrough", "innovation",
    "success", "momentum", "optimistic", "record", "high", "moon", "mooning",
    "pump", "pumping", "green", "win", "winning", "love", "great", "amazing",
    "awesome", "good", "best", "excited", "exciting", "huge", "adoption",
    "recovery", "rebound", "upside", "opportunity", "undervalued", "gem",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "loss", "losses", "fall", "plunge", "crash", "dump",
    "dumping", "weak", "negative", "drop", "concern", "risk", "fail", "failed",
    "disappoint", "slump", "warning", "pessimistic", "fear", "fud", "panic",
    "trouble", "hack", "hacked", "exploit", "bankruptcy", "lawsuit", "red",
    "bad", "worst", "terrible", "rekt", "overvalued", "bubble", "down",
];

pub struct LexiconSentimentAnalyzer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl Default for LexiconSentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    /// Polarity in [-1, 1]; 0.0 for text with no tokens
    pub fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return 0.0;
        }

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut score: i32 = 0;

        for (i, word) in words.iter().enumerate() {
            let is_positive = self.positive.contains(*word);
            let is_negative = self.negative.contains(*word);

            if !is_positive && !is_negative {
                continue;
            }

            let negated = negation_positions
                .iter()
                .any(|&neg| neg < i && i - neg <= NEGATION_WINDOW);

            let sign = if is_positive { 1 } else { -1 };
            score += if negated { -sign } else { sign };
        }

        f64::from(score) / f64::from(u32::try_from(words.len()).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl SentimentAnalyzer for LexiconSentimentAnalyzer {
    async fn analyze_sentiment(&self, text: &str) -> Result<bool> {
        let polarity = self.polarity(text);
        tracing::debug!(polarity, "Computed sentiment polarity");
        Ok(polarity > 0.0)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
