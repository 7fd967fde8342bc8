//! Content Cycle
//!
//! One cycle: fetch trends, retrieve context, generate a draft, vet and
//! score it, publish if accepted, record metrics. Cycles never overlap: the
//! running reward totals are held under a mutex for the whole cycle, which
//! serializes scheduled and on-demand runs.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use content_vetting::{Candidate, ContentVetter, Evaluation, RewardScorer, RewardTotals, VettingResult};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::error::{PipelineError, Result};
use crate::generator::PostGenerator;
use crate::publish::{MetricsLog, MetricsRecord, PublishOutcome, PublishSink, NOT_POSTED_STATUS};
use crate::retrieval::Retriever;
use crate::trends::TrendSource;

/// Everything that happened to one candidate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleReport {
    pub candidate: Candidate,
    pub vetting: VettingResult,
    pub evaluation: Evaluation,
    /// Empty when vetting rejected the candidate
    pub published: Vec<PublishOutcome>,
    pub duration_ms: u64,
}

impl CycleReport {
    /// Status of the first sink, or the not-posted status
    pub fn publish_status(&self) -> &str {
        if !self.vetting.accepted {
            return NOT_POSTED_STATUS;
        }
        self.published
            .first()
            .map_or("No publish sinks configured.", |o| o.status.as_str())
    }
}

pub struct ContentPipeline {
    trends: Arc<dyn TrendSource>,
    retriever: Arc<dyn Retriever>,
    generator: PostGenerator,
    vetter: ContentVetter,
    scorer: RewardScorer,
    sinks: Vec<Arc<dyn PublishSink>>,
    metrics: Option<MetricsLog>,
    context_limit: usize,
    totals: Mutex<RewardTotals>,
}

impl ContentPipeline {
    pub fn builder() -> ContentPipelineBuilder {
        ContentPipelineBuilder::new()
    }

    /// Running totals across all cycles so far
    pub async fn totals(&self) -> RewardTotals {
        *self.totals.lock().await
    }

    pub fn generator(&self) -> &PostGenerator {
        &self.generator
    }

    /// Run one full cycle
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut totals = self.totals.lock().await;
        let started = Instant::now();

        let trends = self.trends.fetch_trends().await?;
        if trends.is_empty() {
            tracing::warn!(source = self.trends.name(), "No relevant trends this cycle");
        }

        let context = self
            .retriever
            .retrieve(&trends.join(", "), self.context_limit)
            .await?;

        let text = self.generator.generate(&trends, &context).await?;
        let candidate = Candidate::new(text, trends, context);

        let vetting = self.vetter.vet(&candidate.text);
        let evaluation = self.scorer.evaluate(&candidate.text, *totals).await;
        *totals = evaluation.totals;

        let published = if vetting.accepted {
            self.publish(&candidate).await
        } else {
            Vec::new()
        };

        let report = CycleReport {
            candidate,
            vetting,
            evaluation,
            published,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if let Some(metrics) = &self.metrics {
            if let Err(e) = metrics.record(&MetricsRecord::from(&report)).await {
                tracing::warn!(error = %e, path = %metrics.path().display(), "Failed to record metrics");
            }
        }

        tracing::info!(
            candidate = %report.candidate.id,
            accepted = report.vetting.accepted,
            reason = %report.vetting.reason,
            cycle_total = report.evaluation.breakdown.total,
            score = report.evaluation.score(),
            duration_ms = report.duration_ms,
            "Cycle complete"
        );

        Ok(report)
    }

    /// Vet and score arbitrary text against zeroed totals.
    /// Nothing is published and the running totals are untouched.
    pub async fn assess(&self, text: &str) -> (VettingResult, Evaluation) {
        let vetting = self.vetter.vet(text);
        let evaluation = self.scorer.evaluate(text, RewardTotals::default()).await;
        (vetting, evaluation)
    }

    /// Store the post for retrieval, then hand it to every sink.
    /// Sink failures are reported in the outcome, not raised.
    async fn publish(&self, candidate: &Candidate) -> Vec<PublishOutcome> {
        if let Err(e) = self.retriever.store(&candidate.text).await {
            tracing::warn!(error = %e, "Failed to store post in corpus");
        }

        let mut outcomes = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            let outcome = match sink.publish(candidate).await {
                Ok(status) => PublishOutcome::success(sink.name(), status),
                Err(e) => {
                    tracing::warn!(sink = sink.name(), error = %e, "Publish failed");
                    PublishOutcome::failure(sink.name(), e.to_string())
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Run a cycle every `interval` until `shutdown` resolves.
    /// A failed cycle is logged and skipped.
    pub async fn run_forever<F>(self: Arc<Self>, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = interval.as_secs(), "Agent loop started");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Agent loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::warn!(
                            stage = e.stage(),
                            retryable = e.is_retryable(),
                            error = %e,
                            "Cycle skipped"
                        );
                    }
                }
            }
        }
    }
}

/// Builder for `ContentPipeline`
pub struct ContentPipelineBuilder {
    trends: Option<Arc<dyn TrendSource>>,
    retriever: Option<Arc<dyn Retriever>>,
    generator: Option<PostGenerator>,
    vetter: ContentVetter,
    scorer: Option<RewardScorer>,
    sinks: Vec<Arc<dyn PublishSink>>,
    metrics: Option<MetricsLog>,
    context_limit: usize,
    initial_totals: RewardTotals,
}

impl Default for ContentPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentPipelineBuilder {
    pub fn new() -> Self {
        Self {
            trends: None,
            retriever: None,
            generator: None,
            vetter: ContentVetter::default(),
            scorer: None,
            sinks: Vec::new(),
            metrics: None,
            context_limit: 4,
            initial_totals: RewardTotals::default(),
        }
    }

    #[must_use]
    pub fn trends(mut self, trends: Arc<dyn TrendSource>) -> Self {
        self.trends = Some(trends);
        self
    }

    #[must_use]
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    #[must_use]
    pub fn generator(mut self, generator: PostGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn vetter(mut self, vetter: ContentVetter) -> Self {
        self.vetter = vetter;
        self
    }

    #[must_use]
    pub fn scorer(mut self, scorer: RewardScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn PublishSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn metrics(mut self, metrics: MetricsLog) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub const fn context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    /// Resume from totals carried over from an earlier run
    #[must_use]
    pub const fn initial_totals(mut self, totals: RewardTotals) -> Self {
        self.initial_totals = totals;
        self
    }

    pub fn build(self) -> Result<ContentPipeline> {
        let missing = |what: &str| PipelineError::Config(format!("{what} is required"));

        Ok(ContentPipeline {
            trends: self.trends.ok_or_else(|| missing("Trend source"))?,
            retriever: self.retriever.ok_or_else(|| missing("Retriever"))?,
            generator: self.generator.ok_or_else(|| missing("Generator"))?,
            vetter: self.vetter,
            scorer: self.scorer.ok_or_else(|| missing("Reward scorer"))?,
            sinks: self.sinks,
            metrics: self.metrics,
            context_limit: self.context_limit,
            totals: Mutex::new(self.initial_totals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::CannedProvider;
    use crate::publish::SimulatedTwitterSink;
    use crate::retrieval::{ChunkingConfig, CorpusRetriever};
    use crate::trends::FixedTrendSource;
    use agent_core::GenerationOptions;
    use async_trait::async_trait;
    use content_vetting::{KnownEntityChecker, LexiconSentimentAnalyzer, ScoringRules};

    struct FailingTrends;

    #[async_trait]
    impl TrendSource for FailingTrends {
        async fn fetch_trends(&self) -> Result<Vec<String>> {
            Err(PipelineError::TrendFetch("feed down".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FailingSink;

    #[async_trait]
    impl PublishSink for FailingSink {
        async fn publish(&self, _candidate: &Candidate) -> Result<String> {
            Err(PipelineError::Publish {
                sink: "failing".into(),
                message: "401".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn builder_with_reply(reply: &str) -> (ContentPipelineBuilder, Arc<CannedProvider>) {
        let provider = Arc::new(CannedProvider::new(reply));
        let generator =
            PostGenerator::new(provider.clone(), "Crypto Banter", GenerationOptions::default()).unwrap();
        let scorer = RewardScorer::new(
            ScoringRules::default(),
            Arc::new(KnownEntityChecker::major_coins()),
            Arc::new(LexiconSentimentAnalyzer::new()),
        );
        let retriever = CorpusRetriever::from_text(
            "Bitcoin to the moon, DYOR\nEthereum gas is cheap today",
            ChunkingConfig {
                chunk_size: 1,
                chunk_overlap: 0,
                ..ChunkingConfig::default()
            },
        );

        let builder = ContentPipeline::builder()
            .trends(Arc::new(FixedTrendSource::new(["Bitcoin", "Ethereum"])))
            .retriever(Arc::new(retriever))
            .generator(generator)
            .scorer(scorer)
            .sink(Arc::new(SimulatedTwitterSink));

        (builder, provider)
    }

    #[tokio::test]
    async fn test_accepted_cycle_publishes() {
        let (builder, provider) =
            builder_with_reply("DYOR! To the moon! Bitcoin is mooning, are you bullish?");
        let pipeline = builder.build().unwrap();

        let report = pipeline.run_cycle().await.unwrap();

        assert!(report.vetting.accepted);
        assert_eq!(report.publish_status(), "Tweet posted successfully");
        assert_eq!(report.candidate.source_trends, vec!["Bitcoin", "Ethereum"]);
        assert_eq!(report.candidate.context_snippets.len(), 2);
        assert_eq!(report.evaluation.totals, RewardTotals::new(4, 0));
        assert_eq!(pipeline.totals().await, RewardTotals::new(4, 0));

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Recent crypto trends: Bitcoin, Ethereum"));
        assert!(prompts[0].contains("Bitcoin to the moon, DYOR"));
    }

    #[tokio::test]
    async fn test_rejected_cycle_not_published_but_scored() {
        let (builder, _) = builder_with_reply("This Bitcoin project is a scam");
        let pipeline = builder.build().unwrap();

        let report = pipeline.run_cycle().await.unwrap();

        assert!(!report.vetting.accepted);
        assert!(report.published.is_empty());
        assert_eq!(report.publish_status(), NOT_POSTED_STATUS);
        // style miss, fact hit, sentiment miss
        assert_eq!(report.evaluation.delta, RewardTotals::new(1, 2));
    }

    #[tokio::test]
    async fn test_totals_accumulate_across_cycles() {
        let (builder, _) = builder_with_reply("HODL HODL, Bitcoin looking strong?");
        let pipeline = builder.initial_totals(RewardTotals::new(2, 5)).build().unwrap();

        let first = pipeline.run_cycle().await.unwrap();
        let second = pipeline.run_cycle().await.unwrap();

        assert_eq!(first.evaluation.totals, RewardTotals::new(6, 5));
        assert_eq!(second.evaluation.totals, RewardTotals::new(10, 5));
        assert_eq!(second.evaluation.score(), 5);
    }

    #[tokio::test]
    async fn test_upstream_failure_aborts_cycle_only() {
        let (builder, provider) = builder_with_reply("HODL");
        let pipeline = builder.trends(Arc::new(FailingTrends)).build().unwrap();

        let err = pipeline.run_cycle().await.unwrap_err();

        assert_eq!(err.stage(), "trends");
        assert!(provider.prompts.lock().unwrap().is_empty());
        assert_eq!(pipeline.totals().await, RewardTotals::default());
    }

    #[tokio::test]
    async fn test_sink_failure_reported() {
        let (builder, _) = builder_with_reply("Bitcoin HODL DYOR");
        let pipeline = builder.sink(Arc::new(FailingSink)).build().unwrap();

        let report = pipeline.run_cycle().await.unwrap();

        assert_eq!(report.published.len(), 2);
        assert!(report.published[0].success);
        assert!(!report.published[1].success);
    }

    #[tokio::test]
    async fn test_metrics_recorded_every_cycle() {
        let path = std::env::temp_dir().join(format!("metrics-{}.jsonl", uuid::Uuid::new_v4()));
        let (builder, _) = builder_with_reply("Ponzi vibes on Bitcoin");
        let pipeline = builder.metrics(MetricsLog::new(&path)).build().unwrap();

        pipeline.run_cycle().await.unwrap();
        pipeline.run_cycle().await.unwrap();

        let records = MetricsLog::new(&path).read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].accepted);
        assert!(records[0].published_to.is_empty());
        assert_eq!(records[1].totals, records[0].totals.combine(records[1].delta));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_assess_leaves_totals_alone() {
        let (builder, provider) = builder_with_reply("unused");
        let pipeline = builder.build().unwrap();

        let (vetting, evaluation) = pipeline.assess("DYOR! To the moon! Bitcoin is mooning?").await;

        assert!(vetting.accepted);
        assert_eq!(evaluation.totals, RewardTotals::new(4, 0));
        assert_eq!(pipeline.totals().await, RewardTotals::default());
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_builder_requires_parts() {
        let err = ContentPipeline::builder().build().err().unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_forever_stops_on_shutdown() {
        let (builder, provider) = builder_with_reply("Bitcoin HODL DYOR");
        let pipeline = Arc::new(builder.build().unwrap());

        pipeline
            .clone()
            .run_forever(Duration::from_secs(3600), async {
                tokio::time::sleep(Duration::from_millis(100)).await;
            })
            .await;

        // First tick fires immediately, the next one is an hour away
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);
    }
}
