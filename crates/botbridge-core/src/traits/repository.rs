// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator contracts.
//!
//! CRUD-only: no business logic is expected from implementations. The
//! pipeline owns all state-machine and conversation semantics.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::{BotEvent, Conversation, StoredMessage};

/// Store for [`BotEvent`] records and their status state machine.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event in `pending` status.
    async fn insert_event(&self, event: &BotEvent) -> Result<(), BridgeError>;

    /// Advances `pending` -> `processing`.
    async fn mark_processing(&self, id: &str) -> Result<(), BridgeError>;

    /// Terminal success: records processing time and attempt count.
    async fn mark_completed(
        &self,
        id: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError>;

    /// Terminal failure: records the error message for observability.
    async fn mark_failed(
        &self,
        id: &str,
        error_message: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError>;

    async fn get_event(&self, id: &str) -> Result<Option<BotEvent>, BridgeError>;
}

/// Repository for conversations and their append-only message log.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), BridgeError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, BridgeError>;

    async fn append_message(&self, message: &StoredMessage) -> Result<(), BridgeError>;

    /// Most recent `limit` messages in chronological order.
    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, BridgeError>;

    async fn message_count(&self, conversation_id: &str) -> Result<i64, BridgeError>;
}
