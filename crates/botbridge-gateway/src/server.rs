// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use botbridge_core::{AdapterRegistry, Bot, BridgeError, EventStore};
use botbridge_pipeline::WorkQueue;

use crate::handlers;

/// Shared state for webhook handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bots by id.
    pub bots: Arc<HashMap<String, Bot>>,
    pub adapters: Arc<AdapterRegistry>,
    pub events: Arc<dyn EventStore>,
    pub queue: WorkQueue,
    pub start_time: Instant,
}

/// Bind address configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhooks/bot/{bot_id}/{token}",
            post(handlers::post_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves webhook ingress until the shutdown token fires.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), BridgeError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::Network(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| BridgeError::Network(format!("webhook server error: {e}")))?;

    Ok(())
}
