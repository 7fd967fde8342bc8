//! Sentiment Analysis
//!
//! Posts must read as positive. Implementations return true iff the
//! computed polarity is strictly greater than zero.

mod lexicon;

pub use lexicon::LexiconSentimentAnalyzer;

use async_trait::async_trait;

use crate::error::Result;

/// Capability: is the polarity of `text` strictly positive?
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze_sentiment(&self, text: &str) -> Result<bool>;

    fn name(&self) -> &str;
}
