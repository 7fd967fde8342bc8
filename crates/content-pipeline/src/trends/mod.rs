//! Trend Sources
//!
//! Trending topics from a market-data feed, filtered down to the ones worth
//! posting about.

mod coingecko;
mod fixed;

pub use coingecko::{CoinGeckoTrendSource, TrendSourceConfig};
pub use fixed::FixedTrendSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trend source trait (Strategy pattern)
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Relevant trending topic names, in feed order
    async fn fetch_trends(&self) -> Result<Vec<String>>;

    fn name(&self) -> &str;
}

/// Keeps topics whose name contains one of the keywords (case-insensitive)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(["bitcoin", "ethereum", "defi", "nft", "web3", "altcoin"])
    }
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Comma-separated keywords, e.g. `"bitcoin,ethereum,defi"`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_relevant(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
