//! Simulated Twitter sink
//!
//! Logs the post instead of calling the platform API.

use async_trait::async_trait;
use content_vetting::Candidate;

use super::PublishSink;
use crate::error::Result;

pub const POSTED_STATUS: &str = "Tweet posted successfully";

#[derive(Debug, Default)]
pub struct SimulatedTwitterSink;

#[async_trait]
impl PublishSink for SimulatedTwitterSink {
    async fn publish(&self, candidate: &Candidate) -> Result<String> {
        tracing::info!(target: "publish", candidate = %candidate.id, "Twitter: {}", candidate.text);
        Ok(POSTED_STATUS.into())
    }

    fn name(&self) -> &str {
        "twitter"
    }
}
