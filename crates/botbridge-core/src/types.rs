// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the botbridge pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A single result row returned by a datasource, keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Platform-neutral inbound message produced by a platform adapter.
///
/// Immutable once parsed; consumed exactly once per webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub text: String,
    pub external_user_id: String,
    pub external_user_name: Option<String>,
    pub message_type: String,
    pub message_id: Option<String>,
    pub raw_payload: serde_json::Value,
}

/// Bot configuration entity. Owned by the admin layer; read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub name: String,
    /// Platform tag resolved against the adapter registry ("webhook", "slack", ...).
    pub platform: String,
    /// Shared secret carried in the webhook URL path.
    pub token: String,
    pub enabled_actions: Vec<String>,
    pub enabled_datasources: Vec<String>,
    pub default_datasource_id: Option<String>,
    pub ai_provider_id: Option<String>,
    pub enable_query: bool,
    pub is_active: bool,
    pub max_retries: u32,
    pub request_timeout_ms: u64,
}

/// Processing state machine for a [`BotEvent`]. Advances forward only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl EventStatus {
    /// Completed and Failed are terminal; a terminal event is never reprocessed.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Failed)
    }
}

/// One persisted record per inbound webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotEvent {
    pub id: String,
    pub bot_id: String,
    /// Platform-assigned delivery id. Advisory idempotency key only; a
    /// redelivered webhook creates a second event.
    pub external_event_id: String,
    pub content: String,
    pub external_user_id: String,
    pub external_user_name: Option<String>,
    pub internal_user_id: Option<String>,
    pub status: EventStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    pub error_message: Option<String>,
    pub processing_time_ms: Option<u64>,
    pub created_at: String,
}

/// A thread of turns for one (bot, external user) pair.
///
/// Created lazily on first interaction; never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
}

/// Role of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Append-only conversation turn. Two are written per processed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub metadata: Option<String>,
    pub created_at: String,
}

/// Declared type of an action parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

/// Declaration of a single action parameter, driving extraction and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Declared input schema for an action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

/// Admin-authored parameterized operation, invocable by name/keyword match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub action_type: String,
    /// SQL template executed against the action's datasource. `{{name}}`
    /// placeholders are filled from extracted parameters.
    pub payload: String,
    pub datasource_id: String,
    #[serde(default)]
    pub input_schema: Option<InputSchema>,
}

/// Classification of inbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Action,
    Query,
    Unknown,
}

/// Ephemeral result of intent classification.
#[derive(Debug, Clone, Serialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub action_id: Option<String>,
    pub action_name: Option<String>,
    /// Normalized confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
}

impl IntentResult {
    /// The no-match result: unknown intent with zero confidence.
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self {
            intent: Intent::Unknown,
            action_id: None,
            action_name: None,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }
}

/// Aggregated outcome of running one or more SQL snippets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResponse {
    pub rows: Vec<Row>,
    /// The final SQL that was executed (after limit injection), for audit.
    pub sql: Option<String>,
    /// Upstream summary preferred over row rendering when present.
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_status_roundtrips_through_strings() {
        for status in [
            EventStatus::Pending,
            EventStatus::Processing,
            EventStatus::Completed,
            EventStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(EventStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(EventStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn terminal_statuses() {
        assert!(!EventStatus::Pending.is_terminal());
        assert!(!EventStatus::Processing.is_terminal());
        assert!(EventStatus::Completed.is_terminal());
        assert!(EventStatus::Failed.is_terminal());
    }

    #[test]
    fn role_parses_lowercase() {
        assert_eq!(Role::from_str("assistant").unwrap(), Role::Assistant);
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn parameter_spec_deserializes_with_defaults() {
        let json = r#"{"name": "userId", "param_type": "number", "required": true}"#;
        let spec: ParameterSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.name, "userId");
        assert_eq!(spec.param_type, ParamType::Number);
        assert!(spec.required);
        assert!(spec.default.is_none());
    }

    #[test]
    fn unknown_intent_has_zero_confidence() {
        let result = IntentResult::unknown("no signals");
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.action_id.is_none());
    }
}
