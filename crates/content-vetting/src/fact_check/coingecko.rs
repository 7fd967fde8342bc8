//! CoinGecko-backed fact checker
//!
//! Fetches `/coins/list` and caches the lowercased coin names. Once a list
//! has been fetched, callers never wait on the network again: a stale list is
//! served as-is while a single background task refreshes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{mentions_any, FactChecker};
use crate::error::{Result, VettingError};

#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    pub base_url: String,

    /// How long a fetched list is reused
    pub refresh_interval: Duration,

    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            refresh_interval: Duration::from_secs(6 * 3600),
            timeout: Duration::from_secs(30),
        }
    }
}

impl CoinGeckoConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("COINGECKO_BASE_URL").unwrap_or(defaults.base_url);
        let refresh_interval = std::env::var("COIN_LIST_REFRESH_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(defaults.refresh_interval, Duration::from_secs);

        Self {
            base_url,
            refresh_interval,
            timeout: defaults.timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoinListEntry {
    name: String,
}

#[derive(Clone)]
struct Snapshot {
    names: Arc<Vec<String>>,
    fetched_at: Instant,
}

/// State shared with the background refresh task
struct CoinList {
    client: reqwest::Client,
    url: String,
    refresh_interval: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    refreshing: AtomicBool,
}

impl CoinList {
    async fn fetch(&self) -> Result<Vec<String>> {
        let resp = self.client.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VettingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let coins: Vec<CoinListEntry> = resp.json().await?;
        Ok(normalize_names(coins))
    }

    /// Fetch and install a new snapshot. The lock is only taken to swap it in.
    async fn refresh(&self) -> Result<Arc<Vec<String>>> {
        let names = Arc::new(self.fetch().await?);
        tracing::info!(coins = names.len(), "Refreshed coin reference list");

        *self.snapshot.write().await = Some(Snapshot {
            names: Arc::clone(&names),
            fetched_at: Instant::now(),
        });
        Ok(names)
    }

    async fn current(&self) -> Option<Snapshot> {
        self.snapshot.read().await.clone()
    }
}

pub struct CoinGeckoFactChecker {
    list: Arc<CoinList>,
}

impl CoinGeckoFactChecker {
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            list: Arc::new(CoinList {
                client,
                url: format!("{}/coins/list", config.base_url.trim_end_matches('/')),
                refresh_interval: config.refresh_interval,
                snapshot: RwLock::new(None),
                refreshing: AtomicBool::new(false),
            }),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(CoinGeckoConfig::from_env())
    }

    /// Current names. Only the very first fetch is awaited; after that a
    /// stale list is returned at once and refreshed in the background.
    async fn names(&self) -> Result<Arc<Vec<String>>> {
        let Some(snapshot) = self.list.current().await else {
            return self
                .list
                .refresh()
                .await
                .map_err(|e| VettingError::ReferenceUnavailable(e.to_string()));
        };

        if snapshot.fetched_at.elapsed() >= self.list.refresh_interval {
            self.spawn_refresh();
        }
        Ok(snapshot.names)
    }

    fn spawn_refresh(&self) {
        if self.list.refreshing.swap(true, Ordering::AcqRel) {
            return;
        }

        let list = Arc::clone(&self.list);
        tokio::spawn(async move {
            if let Err(e) = list.refresh().await {
                tracing::warn!(error = %e, "Coin list refresh failed, keeping previous snapshot");
            }
            list.refreshing.store(false, Ordering::Release);
        });
    }
}

fn normalize_names(coins: Vec<CoinListEntry>) -> Vec<String> {
    coins
        .into_iter()
        .map(|c| c.name.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

#[async_trait]
impl FactChecker for CoinGeckoFactChecker {
    async fn check_facts(&self, text: &str) -> Result<bool> {
        let names = self.names().await?;
        Ok(mentions_any(text, names.iter()))
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
