// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the botbridge pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

use botbridge_core::types::{Action, Bot, InputSchema};

/// Top-level botbridge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Webhook ingress HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Background worker pool settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Retry/backoff settings for externally-failing operations.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Query execution and conversation-context settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Platform adapters available to bots, keyed by tag.
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,

    /// Datasources queryable by bots.
    #[serde(default)]
    pub datasources: Vec<DatasourceEntry>,

    /// Bots accepting webhook deliveries.
    #[serde(default)]
    pub bots: Vec<BotEntry>,

    /// Admin-authored actions invocable by name/keyword match.
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

/// Webhook ingress server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "botbridge.db".to_string()
}

/// Background worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Bounded queue capacity; ingress returns 503 when full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Number of concurrent worker tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_concurrency() -> usize {
    4
}

/// Retry/backoff configuration for externally-failing operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = max_retries + 1.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Query execution and conversation-context configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// LIMIT injected into unbounded SELECTs.
    #[serde(default = "default_row_limit")]
    pub row_limit: u64,

    /// Most recent messages loaded as conversation context.
    #[serde(default = "default_context_max_messages")]
    pub context_max_messages: i64,

    /// Token budget for prompt-context rendering (4 chars per token estimate).
    #[serde(default = "default_context_token_budget")]
    pub context_token_budget: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            row_limit: default_row_limit(),
            context_max_messages: default_context_max_messages(),
            context_token_budget: default_context_token_budget(),
        }
    }
}

fn default_row_limit() -> u64 {
    100
}

fn default_context_max_messages() -> i64 {
    20
}

fn default_context_token_budget() -> usize {
    512
}

/// One platform adapter registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformEntry {
    /// Tag bots reference via `platform`.
    pub tag: String,

    /// Shared secret for webhook signature verification.
    #[serde(default)]
    pub signing_secret: Option<String>,

    /// URL replies are POSTed back to.
    #[serde(default)]
    pub reply_url: Option<String>,
}

/// One registered datasource.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatasourceEntry {
    pub id: String,
    pub name: String,
    /// Engine tag ("sqlite" is the only built-in).
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Path to the SQLite file for the built-in engine.
    pub path: String,
}

fn default_engine() -> String {
    "sqlite".to_string()
}

/// One configured bot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotEntry {
    pub id: String,
    pub name: String,
    pub platform: String,
    /// Webhook path token; requests with a different token get 401.
    pub token: String,
    #[serde(default)]
    pub enabled_actions: Vec<String>,
    #[serde(default)]
    pub enabled_datasources: Vec<String>,
    #[serde(default)]
    pub default_datasource_id: Option<String>,
    #[serde(default)]
    pub ai_provider_id: Option<String>,
    #[serde(default = "default_true")]
    pub enable_query: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl From<BotEntry> for Bot {
    fn from(entry: BotEntry) -> Self {
        Bot {
            id: entry.id,
            name: entry.name,
            platform: entry.platform,
            token: entry.token,
            enabled_actions: entry.enabled_actions,
            enabled_datasources: entry.enabled_datasources,
            default_datasource_id: entry.default_datasource_id,
            ai_provider_id: entry.ai_provider_id,
            enable_query: entry.enable_query,
            is_active: entry.is_active,
            max_retries: entry.max_retries,
            request_timeout_ms: entry.request_timeout_ms,
        }
    }
}

/// One admin-authored action.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_action_type")]
    pub action_type: String,
    /// SQL template with `{{name}}` placeholders.
    pub payload: String,
    pub datasource_id: String,
    #[serde(default)]
    pub input_schema: Option<InputSchema>,
}

fn default_action_type() -> String {
    "sql".to_string()
}

impl From<ActionEntry> for Action {
    fn from(entry: ActionEntry) -> Self {
        Action {
            id: entry.id,
            name: entry.name,
            description: entry.description,
            action_type: entry.action_type,
            payload: entry.payload,
            datasource_id: entry.datasource_id,
            input_schema: entry.input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = BridgeConfig::default();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.query.row_limit, 100);
        assert!(config.bots.is_empty());
    }

    #[test]
    fn bot_entry_converts_to_bot() {
        let entry = BotEntry {
            id: "b1".into(),
            name: "metrics".into(),
            platform: "webhook".into(),
            token: "tok".into(),
            enabled_actions: vec!["a1".into()],
            enabled_datasources: vec!["ds1".into()],
            default_datasource_id: Some("ds1".into()),
            ai_provider_id: None,
            enable_query: true,
            is_active: true,
            max_retries: 2,
            request_timeout_ms: 5000,
        };
        let bot: Bot = entry.into();
        assert_eq!(bot.id, "b1");
        assert_eq!(bot.enabled_actions, vec!["a1".to_string()]);
        assert!(bot.enable_query);
    }
}
