//! # content-pipeline
//!
//! The agent's cycle, wired around the vetting core:
//!
//! ```text
//! TrendSource ──▶ Retriever ──▶ PostGenerator ──▶ ContentVetter ──┬──▶ PublishSink(s)
//!  (CoinGecko)    (corpus)       (LlmProvider)    RewardScorer    └──▶ MetricsLog
//! ```
//!
//! Collaborators sit behind traits so tests and offline runs can swap in
//! fixed implementations.

pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod publish;
pub mod retrieval;
pub mod trends;

pub use config::{FactCheckMode, PipelineConfig};
pub use error::{PipelineError, Result};
pub use generator::PostGenerator;
pub use pipeline::{ContentPipeline, ContentPipelineBuilder, CycleReport};
pub use publish::{MetricsLog, PublishOutcome, PublishSink, SimulatedTwitterSink};
pub use retrieval::{ChunkingConfig, CorpusRetriever, Retriever};
pub use trends::{CoinGeckoTrendSource, FixedTrendSource, RelevanceFilter, TrendSource};
