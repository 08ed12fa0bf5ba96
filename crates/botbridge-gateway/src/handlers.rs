// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress handlers.
//!
//! The POST handler answers the platform immediately after durable enqueue
//! of a pending event; classification, execution, and replies all happen on
//! the worker pool. Nothing here blocks on processing.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, warn};

use botbridge_core::{BotEvent, EventStatus};
use botbridge_pipeline::WorkItem;

use crate::server::AppState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /webhooks/bot/{bot_id}/{token}
///
/// Unknown or inactive bot -> 404; bad token or signature -> 401; challenge
/// handshakes answered inline; ignorable deliveries acknowledged; otherwise
/// a pending event is stored and queued, 202. A full queue sheds with 503.
pub async fn post_webhook(
    State(state): State<AppState>,
    Path((bot_id, token)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(bot) = state.bots.get(&bot_id).filter(|b| b.is_active) else {
        return error_response(StatusCode::NOT_FOUND, "unknown bot");
    };
    if bot.token != token {
        return error_response(StatusCode::UNAUTHORIZED, "invalid token");
    }

    let adapter = match state.adapters.get(&bot.platform) {
        Ok(adapter) => adapter,
        Err(error) => {
            warn!(bot_id = bot_id.as_str(), %error, "no adapter for bot platform");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "platform unavailable");
        }
    };

    let signature = header_str(&headers, "x-signature");
    let timestamp = header_str(&headers, "x-timestamp");
    if !adapter.verify_signature(&body, signature.as_deref(), timestamp.as_deref()) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "invalid JSON payload"),
    };

    if let Some(challenge) = adapter.handle_challenge(&payload) {
        return (StatusCode::OK, Json(serde_json::json!({ "challenge": challenge })))
            .into_response();
    }

    let Some(parsed) = adapter.parse_message(&payload) else {
        debug!(bot_id = bot_id.as_str(), "delivery carries no processable message");
        return (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "status": "ignored" })),
        )
            .into_response();
    };

    let event = BotEvent {
        id: uuid::Uuid::new_v4().to_string(),
        bot_id: bot.id.clone(),
        external_event_id: parsed
            .message_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        content: parsed.text.clone(),
        external_user_id: parsed.external_user_id.clone(),
        external_user_name: parsed.external_user_name.clone(),
        internal_user_id: None,
        status: EventStatus::Pending,
        retry_count: 0,
        max_retries: bot.max_retries,
        error_message: None,
        processing_time_ms: None,
        created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    };

    if let Err(error) = state.events.insert_event(&event).await {
        warn!(bot_id = bot_id.as_str(), %error, "could not persist event");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable");
    }

    let event_id = event.id.clone();
    if state
        .queue
        .try_submit(WorkItem {
            bot: bot.clone(),
            event,
        })
        .is_err()
    {
        // The pending row stays behind for operator visibility.
        warn!(bot_id = bot_id.as_str(), event_id = event_id.as_str(), "work queue full, shedding");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "queue full");
    }

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted", "event_id": event_id })),
    )
        .into_response()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
