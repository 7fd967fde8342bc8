//! Pipeline Configuration
//!
//! Read from the environment (after `.env` is loaded by the binary).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Where fact checks get their entity list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactCheckMode {
    /// Live coin list from the market-data API
    CoinGecko,
    /// Built-in snapshot, no network
    Offline,
}

impl std::str::FromStr for FactCheckMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "coingecko" => Ok(Self::CoinGecko),
            "offline" => Ok(Self::Offline),
            other => Err(PipelineError::Config(format!("unknown FACT_CHECK_MODE '{other}'"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Time between scheduled cycles
    pub poll_interval: Duration,

    /// Bound on each fact/sentiment call
    pub signal_timeout: Duration,

    /// Context snippets passed to the prompt
    pub context_limit: usize,

    /// Historical content, one post per line
    pub corpus_path: PathBuf,

    /// JSONL metrics log; `None` disables it
    pub metrics_path: Option<PathBuf>,

    /// Voice the generator imitates
    pub persona: String,

    pub fact_check: FactCheckMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3600),
            signal_timeout: Duration::from_secs(10),
            context_limit: 4,
            corpus_path: PathBuf::from("data/content.txt"),
            metrics_path: Some(PathBuf::from("data/metrics.jsonl")),
            persona: "Crypto Banter".into(),
            fact_check: FactCheckMode::CoinGecko,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let poll_interval = env_secs("POLL_INTERVAL_SECS").unwrap_or(defaults.poll_interval);
        if poll_interval.is_zero() {
            return Err(PipelineError::Config("POLL_INTERVAL_SECS must be positive".into()));
        }

        let metrics_path = match std::env::var("METRICS_PATH") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => defaults.metrics_path,
        };

        let fact_check = match std::env::var("FACT_CHECK_MODE") {
            Ok(mode) => mode.parse()?,
            Err(_) => defaults.fact_check,
        };

        Ok(Self {
            poll_interval,
            signal_timeout: env_secs("SIGNAL_TIMEOUT_SECS").unwrap_or(defaults.signal_timeout),
            context_limit: std::env::var("CONTEXT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.context_limit),
            corpus_path: std::env::var("CORPUS_PATH").map_or(defaults.corpus_path, PathBuf::from),
            metrics_path,
            persona: std::env::var("PERSONA_NAME").unwrap_or(defaults.persona),
            fact_check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3600));
        assert_eq!(config.context_limit, 4);
        assert_eq!(config.fact_check, FactCheckMode::CoinGecko);
    }

    #[test]
    fn test_fact_check_mode_parse() {
        assert_eq!("Offline".parse::<FactCheckMode>().unwrap(), FactCheckMode::Offline);
        assert!("wikipedia".parse::<FactCheckMode>().is_err());
    }
}
