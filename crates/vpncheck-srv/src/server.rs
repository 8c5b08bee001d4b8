//! HTTP server runner: one method-agnostic endpoint.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use vpncheck_client::{IpapiClient, LookupCache, MemoryCache};

use crate::config::ServerConfig;
use crate::emitter;
use crate::pipeline::Pipeline;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Wire the pipeline's dependencies from config.
pub fn build_pipeline(config: &ServerConfig, api_key: Option<String>) -> crate::Result<Pipeline> {
    let client = IpapiClient::builder()
        .base_url(&config.ipapi.base_url)
        .api_key(api_key)
        .timeout(config.ipapi.timeout())
        .build()?;

    let policy = config.cache.policy();
    let cache = LookupCache::new(Arc::new(MemoryCache::new(policy.max_entries)));

    Ok(Pipeline::new(
        client,
        cache,
        policy.ttl,
        config.edge_headers.clone(),
    ))
}

/// Build the router for `route`.
pub fn router(route: &str, state: AppState) -> Router {
    Router::new()
        .route(route, any(ip_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ip_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let report = state.pipeline.inspect(&headers).await;
    emitter::emit(&report)
}

/// Start the endpoint and serve until Ctrl-C.
pub async fn run(config: &ServerConfig, api_key: Option<String>) -> crate::Result<()> {
    let keyed = api_key.is_some();
    let pipeline = build_pipeline(config, api_key)?;
    let app = router(&config.route, AppState::new(pipeline));

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| crate::SrvError::Server(format!("bind {}: {e}", config.listen)))?;

    info!(
        addr = %config.listen,
        route = %config.route,
        upstream = %config.ipapi.base_url,
        keyed,
        cache_ttl_secs = config.cache.ttl_secs,
        "vpncheck endpoint running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::SrvError::Server(format!("server error: {e}")))?;

    info!("vpncheck endpoint stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
