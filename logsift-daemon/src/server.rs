//! HTTP boundary -- axum router over [`DecoderEngine`].
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | POST | `/api/decoders/process-batch` | `MatchResult[]` |
//! | POST | `/api/decoders/run-integrity-test` | `TestReport` |
//! | POST | `/api/decoders/:decoder_id/run-tests` | `TestReport` |
//! | GET | `/health` | `DaemonHealth` |
//!
//! Handlers hold no state between requests. Every request fetches a fresh
//! rule snapshot through the engine.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, MatchedPath, Path, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use logsift_core::config::LogsiftConfig;
use logsift_core::metrics as m;
use logsift_core::types::{MatchResult, TestReport};
use logsift_engine::{DecoderEngine, RuleStore, YamlRuleStore};

use crate::error::{ApiError, NO_LOGS_MESSAGE};
use crate::health::{self, DaemonHealth};

/// Extra room on top of `engine.max_input_bytes` for JSON framing and escapes.
pub const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Shared handler state.
pub struct AppState<S> {
    pub engine: DecoderEngine<S>,
    pub started_at: Instant,
}

impl<S: RuleStore> AppState<S> {
    pub fn new(engine: DecoderEngine<S>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }
}

/// Request body for batch decode.
#[derive(Debug, Deserialize)]
pub struct ProcessBatchRequest {
    #[serde(default)]
    pub logs: Option<String>,
}

/// Build the router for the given state.
pub fn router<S: RuleStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let body_limit = state
        .engine
        .limits()
        .max_input_bytes
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/api/decoders/process-batch", post(process_batch::<S>))
        .route(
            "/api/decoders/run-integrity-test",
            post(run_integrity_test::<S>),
        )
        .route(
            "/api/decoders/:decoder_id/run-tests",
            post(run_decoder_tests::<S>),
        )
        .route("/health", get(health_check::<S>))
        .route_layer(middleware::from_fn(track_requests))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn process_batch<S: RuleStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<ProcessBatchRequest>, JsonRejection>,
) -> Result<Json<Vec<MatchResult>>, ApiError> {
    let Json(request) = body?;
    let logs = request
        .logs
        .filter(|logs| !logs.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(NO_LOGS_MESSAGE.to_owned()))?;

    let results = state.engine.batch_decode(&logs).await?;
    Ok(Json(results))
}

async fn run_integrity_test<S: RuleStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TestReport>, ApiError> {
    Ok(Json(state.engine.run_integrity_test().await?))
}

async fn run_decoder_tests<S: RuleStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(decoder_id): Path<String>,
) -> Result<Json<TestReport>, ApiError> {
    Ok(Json(state.engine.run_decoder_test(&decoder_id).await?))
}

async fn health_check<S: RuleStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> DaemonHealth {
    health::check(state.engine.store(), state.started_at).await
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    metrics::counter!(
        m::HTTP_REQUESTS_TOTAL,
        m::LABEL_ROUTE => route,
        m::LABEL_STATUS => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}

/// Bind the API listener and serve until Ctrl-C.
pub async fn serve(config: &LogsiftConfig) -> Result<()> {
    let store = YamlRuleStore::new(&config.store.rules_path);

    // startup probe only; every request re-reads the file
    match store.fetch_snapshot().await {
        Ok(snapshot) => tracing::info!(
            rules = %config.store.rules_path,
            services = snapshot.services.len(),
            decoders = snapshot.decoders.len(),
            "rule file loaded"
        ),
        Err(e) => tracing::warn!(
            rules = %config.store.rules_path,
            error = %e,
            "rule file not readable at startup, requests will fail until it is"
        ),
    }

    let state = Arc::new(AppState::new(DecoderEngine::new(store, &config.engine)));
    let app = router(state);

    let addr = format!("{}:{}", config.server.listen_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    tracing::info!(listen_addr = %addr, "logsift-daemon listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
