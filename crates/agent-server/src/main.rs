//! trend-post-agent HTTP Server
//!
//! Runs the scheduled content loop and an Axum API for on-demand cycles,
//! reward totals, and ad hoc vetting.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{GenerationOptions, LlmProvider};
use agent_runtime::ProviderKind;
use content_pipeline::{
    ChunkingConfig, CoinGeckoTrendSource, ContentPipeline, CorpusRetriever, FactCheckMode,
    MetricsLog, PipelineConfig, PostGenerator, SimulatedTwitterSink,
};
use content_vetting::{
    CoinGeckoFactChecker, ContentVetter, FactChecker, KnownEntityChecker,
    LexiconSentimentAnalyzer, RewardScorer, RuleSet,
};

use crate::handlers::{assess, generate_post, health_check, rewards};
use crate::state::AppState;

const DEFAULT_LOG: &str = "info,tower_http=debug";

/// `RUST_LOG` from the process or `.env`, else the default directives
fn log_directives() -> String {
    dotenvy::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG.into())
}

fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/generate_post", get(generate_post))
        .route("/api/rewards", get(rewards))
        .route("/api/vet", post(assess))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_directives()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rules = RuleSet::from_env()?;
    let config = PipelineConfig::from_env()?;

    // Initialize LLM provider
    let kind = ProviderKind::from_env()?;
    let provider = agent_runtime::provider_from_env(kind)?;

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {}", provider.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - generation will fail until it is", provider.name());
        }
    }

    let options = GenerationOptions {
        model: std::env::var("LLM_MODEL").unwrap_or_else(|_| kind.default_model().into()),
        ..GenerationOptions::default()
    };

    // Scoring capabilities
    let fact_checker: Arc<dyn FactChecker> = match config.fact_check {
        FactCheckMode::CoinGecko => Arc::new(CoinGeckoFactChecker::from_env()?),
        FactCheckMode::Offline => {
            tracing::info!("Fact checks use the built-in coin list");
            Arc::new(KnownEntityChecker::major_coins())
        }
    };
    let scorer = RewardScorer::new(
        rules.scoring.clone(),
        fact_checker,
        Arc::new(LexiconSentimentAnalyzer::new()),
    )
    .with_signal_timeout(config.signal_timeout);

    let retriever = CorpusRetriever::from_file(&config.corpus_path, ChunkingConfig::default()).await?;
    tracing::info!(
        path = %config.corpus_path.display(),
        chunks = retriever.len().await,
        "Corpus loaded"
    );

    let mut builder = ContentPipeline::builder()
        .trends(Arc::new(CoinGeckoTrendSource::from_env()?))
        .retriever(Arc::new(retriever))
        .generator(PostGenerator::new(provider.clone(), config.persona.clone(), options)?)
        .vetter(ContentVetter::new(&rules.vetting))
        .scorer(scorer)
        .sink(Arc::new(SimulatedTwitterSink))
        .context_limit(config.context_limit);

    if let Some(path) = &config.metrics_path {
        tracing::info!(path = %path.display(), "Recording cycle metrics");
        builder = builder.metrics(MetricsLog::new(path));
    }

    let pipeline = Arc::new(builder.build()?);

    // Scheduled loop, stopped by the same signal as the server
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let agent_loop = tokio::spawn(pipeline.clone().run_forever(config.poll_interval, async move {
        let _ = shutdown_rx.changed().await;
    }));

    let state = AppState {
        provider,
        pipeline,
    };

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 trend-post-agent running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health         - Health check");
    tracing::info!("  GET  /generate_post  - Run one cycle now");
    tracing::info!("  GET  /api/rewards    - Running reward totals");
    tracing::info!("  POST /api/vet        - Vet and score text");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    agent_loop.await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_log_directives_parse() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG).is_ok());
    }

    #[test]
    fn test_env_example_log_directives_parse() {
        let example = include_str!("../../../.env.example");
        let rust_log = dotenvy::from_read_iter(example.as_bytes())
            .filter_map(std::result::Result::ok)
            .find(|(key, _)| key == "RUST_LOG")
            .map(|(_, value)| value)
            .unwrap();

        assert!(tracing_subscriber::EnvFilter::try_new(rust_log).is_ok());
    }

    #[tokio::test]
    async fn test_generate_post_route() {
        let app = router(handlers::tests::state("DYOR! To the moon! Bitcoin is mooning?"));

        let response = app
            .clone()
            .oneshot(Request::get("/generate_post").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["vetting_result"], "Content approved.");
        assert_eq!(body["twitter_status"], "Tweet posted successfully");

        let response = app
            .oneshot(Request::get("/api/rewards").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["reward"], 4);
        assert_eq!(body["penalty"], 0);
    }

    #[tokio::test]
    async fn test_vet_route() {
        let app = router(handlers::tests::state("unused"));

        let request = Request::post("/api/vet")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text":"This is a scam"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["accepted"], false);
        assert_eq!(body["reason"], "Content contains inappropriate language.");
    }

    #[tokio::test]
    async fn test_vet_route_rejects_bad_json() {
        let app = router(handlers::tests::state("unused"));

        let request = Request::post("/api/vet")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
