// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the botbridge pipeline.

use thiserror::Error;

/// The primary error type used across the botbridge workspace.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Platform adapter errors (delivery failure, malformed payload, rate limiting).
    #[error("adapter error: {message}")]
    Adapter {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Raw datasource driver errors, carrying the driver message for translation.
    #[error("datasource error: {message}")]
    Datasource { message: String },

    /// SQL rejected by the safety guard before reaching a datasource.
    #[error("unsafe SQL rejected: {0}")]
    SqlRejected(String),

    /// Ad-hoc queries are disabled for this bot.
    #[error("query is disabled for bot {bot_id}")]
    QueryDisabled { bot_id: String },

    /// The requested action is not in the bot's enabled set.
    #[error("action {action_id} is not enabled for bot {bot_id}")]
    ActionNotEnabled { action_id: String, bot_id: String },

    /// An action or query executed but failed downstream.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Transient network failure (connection refused, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// No adapter registered for the requested platform tag.
    #[error("no adapter registered for platform: {0}")]
    AdapterNotFound(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable machine-readable codes attached to structured pipeline failures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    QueryDisabled,
    ActionNotEnabled,
    ExecutionError,
    ProcessingError,
    NetworkError,
    OperationFailed,
    UnknownIntent,
    InvalidSql,
}

impl BridgeError {
    /// Maps an error to the structured code reported back to the platform.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::QueryDisabled { .. } => ErrorCode::QueryDisabled,
            BridgeError::ActionNotEnabled { .. } => ErrorCode::ActionNotEnabled,
            BridgeError::Execution(_) | BridgeError::Datasource { .. } => ErrorCode::ExecutionError,
            BridgeError::Network(_) | BridgeError::Timeout { .. } => ErrorCode::NetworkError,
            BridgeError::SqlRejected(_) => ErrorCode::InvalidSql,
            _ => ErrorCode::ProcessingError,
        }
    }
}
