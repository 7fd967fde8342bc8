//! CoinGecko trending feed
//!
//! `GET /search/trending`. A non-success status yields no trends rather than
//! an error; transport failures are errors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{RelevanceFilter, TrendSource};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct TrendSourceConfig {
    pub base_url: String,
    pub filter: RelevanceFilter,
    pub timeout: Duration,
}

impl Default for TrendSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            filter: RelevanceFilter::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TrendSourceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("COINGECKO_BASE_URL").unwrap_or(defaults.base_url),
            filter: std::env::var("TREND_KEYWORDS")
                .map(|list| RelevanceFilter::parse(&list))
                .unwrap_or(defaults.filter),
            timeout: defaults.timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingCoin>,
}

#[derive(Debug, Deserialize)]
struct TrendingCoin {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    name: String,
}

pub struct CoinGeckoTrendSource {
    client: reqwest::Client,
    base_url: String,
    filter: RelevanceFilter,
}

impl CoinGeckoTrendSource {
    pub fn new(config: TrendSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            filter: config.filter,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TrendSourceConfig::from_env())
    }

    fn relevant_names(&self, response: TrendingResponse) -> Vec<String> {
        response
            .coins
            .into_iter()
            .map(|c| c.item.name)
            .filter(|name| self.filter.is_relevant(name))
            .collect()
    }
}

#[async_trait]
impl TrendSource for CoinGeckoTrendSource {
    async fn fetch_trends(&self) -> Result<Vec<String>> {
        let url = format!("{}/search/trending", self.base_url);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Trending feed unavailable, no trends this cycle");
            return Ok(Vec::new());
        }

        let body: TrendingResponse = resp.json().await?;
        let total = body.coins.len();
        let trends = self.relevant_names(body);
        tracing::debug!(total, relevant = trends.len(), "Fetched trending coins");
        Ok(trends)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `status` and `body` to every connection, returning the base URL
    async fn canned_server(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_relevant_names() {
        let source = CoinGeckoTrendSource::new(TrendSourceConfig::default()).unwrap();
        let body: TrendingResponse = serde_json::from_str(
            r#"{"coins": [
                {"item": {"id": "bitcoin", "name": "Bitcoin", "symbol": "BTC"}},
                {"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE"}},
                {"item": {"id": "nftx", "name": "NFTX", "symbol": "NFTX"}}
            ], "nfts": []}"#,
        )
        .unwrap();

        assert_eq!(source.relevant_names(body), vec!["Bitcoin", "NFTX"]);
    }

    #[test]
    fn test_missing_coins_field() {
        let body: TrendingResponse = serde_json::from_str("{}").unwrap();
        assert!(body.coins.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_feed_errors() {
        let source = CoinGeckoTrendSource::new(TrendSourceConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_millis(200),
            ..TrendSourceConfig::default()
        })
        .unwrap();

        assert!(source.fetch_trends().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_filters_live_feed() {
        let url = canned_server(
            "200 OK",
            r#"{"coins": [
                {"item": {"id": "bitcoin", "name": "Bitcoin", "symbol": "BTC"}},
                {"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE"}},
                {"item": {"id": "defi-pulse", "name": "DeFi Pulse Index", "symbol": "DPI"}}
            ]}"#,
        )
        .await;
        let source = CoinGeckoTrendSource::new(TrendSourceConfig {
            base_url: format!("{url}/"),
            ..TrendSourceConfig::default()
        })
        .unwrap();

        assert_eq!(source.fetch_trends().await.unwrap(), vec!["Bitcoin", "DeFi Pulse Index"]);
    }

    #[tokio::test]
    async fn test_error_status_yields_no_trends() {
        let url = canned_server("500 Internal Server Error", r#"{"error":"down"}"#).await;
        let source = CoinGeckoTrendSource::new(TrendSourceConfig {
            base_url: url,
            ..TrendSourceConfig::default()
        })
        .unwrap();

        assert!(source.fetch_trends().await.unwrap().is_empty());
    }
}
