//! Publishing
//!
//! Sinks receive accepted candidates only. The metrics log receives every
//! cycle, accepted or not.

mod metrics;
mod twitter;

pub use metrics::{MetricsLog, MetricsRecord};
pub use twitter::SimulatedTwitterSink;

use async_trait::async_trait;
use content_vetting::Candidate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status reported when vetting blocks publication
pub const NOT_POSTED_STATUS: &str = "Content not posted (vetting failed).";

#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Publish and return a human-readable status
    async fn publish(&self, candidate: &Candidate) -> Result<String>;

    fn name(&self) -> &str;
}

/// What one sink did with one candidate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub sink: String,
    pub success: bool,
    pub status: String,
}

impl PublishOutcome {
    pub fn success(sink: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            success: true,
            status: status.into(),
        }
    }

    pub fn failure(sink: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            success: false,
            status: error.into(),
        }
    }
}
