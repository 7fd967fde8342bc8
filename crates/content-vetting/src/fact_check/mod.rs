//! Fact Checking
//!
//! A post counts as grounded when it names at least one known real-world
//! entity. Matching is a case-insensitive substring test against a
//! reference list.

mod coingecko;

pub use coingecko::{CoinGeckoConfig, CoinGeckoFactChecker};

use async_trait::async_trait;

use crate::error::Result;

/// Capability: does `text` reference a known entity?
///
/// The reference list may be refreshed between calls, so two calls on the
/// same text can disagree.
#[async_trait]
pub trait FactChecker: Send + Sync {
    async fn check_facts(&self, text: &str) -> Result<bool>;

    fn name(&self) -> &str;
}

/// True iff any (already lowercased) name occurs in `text`
pub(crate) fn mentions_any<'a, I>(text: &str, lowered_names: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let lowered = text.to_lowercase();
    lowered_names
        .into_iter()
        .any(|name| !name.is_empty() && lowered.contains(name.as_str()))
}

/// Checks against a fixed snapshot of entity names
#[derive(Clone, Debug)]
pub struct KnownEntityChecker {
    names: Vec<String>,
}

impl KnownEntityChecker {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Offline snapshot of large-cap coin names
    pub fn major_coins() -> Self {
        Self::new([
            "Bitcoin", "Ethereum", "Solana", "Cardano", "Polkadot", "Chainlink",
            "Avalanche", "Polygon", "Cosmos", "XRP", "Dogecoin", "Shiba Inu",
            "Uniswap", "Litecoin", "Bitcoin Cash", "BNB", "Toncoin",
        ])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl FactChecker for KnownEntityChecker {
    async fn check_facts(&self, text: &str) -> Result<bool> {
        Ok(mentions_any(text, &self.names))
    }

    fn name(&self) -> &str {
        "known_entities"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_entity_case_insensitive() {
        let checker = KnownEntityChecker::major_coins();
        assert!(checker.check_facts("BITCOIN to 100k").await.unwrap());
        assert!(checker.check_facts("shiba inu army").await.unwrap());
        assert!(!checker.check_facts("to the moon with no name").await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_names_ignored() {
        let checker = KnownEntityChecker::new(["", "  ", "Solana"]);
        assert_eq!(checker.len(), 1);
        assert!(!checker.check_facts("anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_list_never_matches() {
        let checker = KnownEntityChecker::new(Vec::<String>::new());
        assert!(checker.is_empty());
        assert!(!checker.check_facts("Bitcoin").await.unwrap());
    }
}
