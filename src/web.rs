use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::search::SearchOrchestrator;

/// Whole-request deadline: interpretation, then resolve and store query side by side
pub fn request_timeout(orchestrator: &SearchOrchestrator) -> Duration {
    orchestrator.options().timeout * 2
}

pub fn app(orchestrator: SearchOrchestrator, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(orchestrator))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(orchestrator: SearchOrchestrator, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let timeout = request_timeout(&orchestrator);
    tracing::info!(
        "Web server running at http://localhost:{} (request timeout {:?})",
        port,
        timeout
    );

    axum::serve(listener, app(orchestrator, timeout))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .with_context(|| "Web server failed")
}
