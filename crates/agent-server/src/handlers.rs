//! HTTP Handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use content_vetting::{RewardBreakdown, RewardTotals};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostResponse {
    pub content: String,
    pub vetting_result: String,
    pub twitter_status: String,
    pub accepted: bool,
    pub trends: Vec<String>,
    pub breakdown: RewardBreakdown,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct RewardsResponse {
    pub reward: u64,
    pub penalty: u64,
    pub net: i64,
}

impl From<RewardTotals> for RewardsResponse {
    fn from(totals: RewardTotals) -> Self {
        Self {
            reward: totals.reward,
            penalty: totals.penalty,
            net: totals.net(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub accepted: bool,
    pub reason: String,
    pub breakdown: RewardBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        provider_connected,
    })
}

/// Run one cycle now and report what happened
pub async fn generate_post(
    State(state): State<AppState>,
) -> Result<Json<GeneratePostResponse>, (StatusCode, Json<ErrorResponse>)> {
    let report = state.pipeline.run_cycle().await.map_err(|e| {
        tracing::error!(stage = e.stage(), "On-demand cycle failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.user_message(),
                code: format!("{}_FAILED", e.stage().to_uppercase()),
            }),
        )
    })?;

    Ok(Json(GeneratePostResponse {
        twitter_status: report.publish_status().to_string(),
        content: report.candidate.text,
        vetting_result: report.vetting.reason,
        accepted: report.vetting.accepted,
        trends: report.candidate.source_trends,
        score: report.evaluation.totals.net(),
        breakdown: report.evaluation.breakdown,
    }))
}

/// Running reward totals
pub async fn rewards(State(state): State<AppState>) -> Json<RewardsResponse> {
    Json(state.pipeline.totals().await.into())
}

/// Vet and score caller-supplied text without publishing it
pub async fn assess(
    State(state): State<AppState>,
    Json(payload): Json<AssessRequest>,
) -> Json<AssessResponse> {
    let (vetting, evaluation) = state.pipeline.assess(&payload.text).await;

    Json(AssessResponse {
        accepted: vetting.accepted,
        reason: vetting.reason,
        breakdown: evaluation.breakdown,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use agent_core::{Completion, GenerationOptions, LlmProvider, Message};
    use async_trait::async_trait;
    use content_pipeline::{
        ChunkingConfig, ContentPipeline, CorpusRetriever, FixedTrendSource, PostGenerator,
        SimulatedTwitterSink,
    };
    use content_vetting::{KnownEntityChecker, LexiconSentimentAnalyzer, RewardScorer, ScoringRules};

    struct EchoProvider(&'static str);

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            Ok(Completion {
                content: self.0.to_string(),
                model: options.model.clone(),
                usage: None,
            })
        }
    }

    pub(crate) fn state(reply: &'static str) -> AppState {
        let provider: Arc<dyn LlmProvider> = Arc::new(EchoProvider(reply));
        let pipeline = ContentPipeline::builder()
            .trends(Arc::new(FixedTrendSource::new(["Bitcoin"])))
            .retriever(Arc::new(CorpusRetriever::new(ChunkingConfig::default())))
            .generator(
                PostGenerator::new(provider.clone(), "Crypto Banter", GenerationOptions::default())
                    .unwrap(),
            )
            .scorer(RewardScorer::new(
                ScoringRules::default(),
                Arc::new(KnownEntityChecker::major_coins()),
                Arc::new(LexiconSentimentAnalyzer::new()),
            ))
            .sink(Arc::new(SimulatedTwitterSink))
            .build()
            .unwrap();

        AppState {
            provider,
            pipeline: Arc::new(pipeline),
        }
    }

    #[tokio::test]
    async fn test_generate_post_accepted() {
        let state = state("DYOR! To the moon! Bitcoin is mooning?");

        let Json(body) = generate_post(State(state.clone())).await.unwrap();

        assert!(body.accepted);
        assert_eq!(body.vetting_result, "Content approved.");
        assert_eq!(body.twitter_status, "Tweet posted successfully");
        assert_eq!(body.score, 4);

        let Json(totals) = rewards(State(state)).await;
        assert_eq!(totals.net, 4);
    }

    #[tokio::test]
    async fn test_generate_post_rejected() {
        let state = state("Bitcoin rug pull incoming");

        let Json(body) = generate_post(State(state)).await.unwrap();

        assert!(!body.accepted);
        assert_eq!(body.vetting_result, "Content contains inappropriate language.");
        assert_eq!(body.twitter_status, "Content not posted (vetting failed).");
    }

    #[tokio::test]
    async fn test_assess() {
        let state = state("unused");

        let Json(body) = assess(
            State(state),
            Json(AssessRequest {
                text: "a".repeat(281),
            }),
        )
        .await;

        assert!(!body.accepted);
        assert_eq!(body.reason, "Content exceeds 280 characters.");
        assert_eq!(body.breakdown.style_score, 0);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health_check(State(state("unused"))).await;
        assert!(body.provider_connected);
        assert_eq!(body.provider, "echo");
    }
}
