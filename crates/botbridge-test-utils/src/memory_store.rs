// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementations of the persistence contracts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use botbridge_core::{
    BotEvent, BridgeError, Conversation, ConversationStore, EventStatus, EventStore, StoredMessage,
};

/// Event store backed by a map. Enforces the same forward-only transitions
/// as the SQLite store.
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<HashMap<String, BotEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&self, id: &str) -> Option<BotEvent> {
        self.events.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_event(&self, event: &BotEvent) -> Result<(), BridgeError> {
        self.events
            .lock()
            .unwrap()
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn mark_processing(&self, id: &str) -> Result<(), BridgeError> {
        let mut events = self.events.lock().unwrap();
        match events.get_mut(id) {
            Some(event) if event.status == EventStatus::Pending => {
                event.status = EventStatus::Processing;
                Ok(())
            }
            _ => Err(BridgeError::Internal(format!(
                "event `{id}` is not pending; refusing status transition"
            ))),
        }
    }

    async fn mark_completed(
        &self,
        id: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError> {
        self.finish(id, EventStatus::Completed, None, processing_time_ms, attempts)
    }

    async fn mark_failed(
        &self,
        id: &str,
        error_message: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError> {
        self.finish(
            id,
            EventStatus::Failed,
            Some(error_message.to_string()),
            processing_time_ms,
            attempts,
        )
    }

    async fn get_event(&self, id: &str) -> Result<Option<BotEvent>, BridgeError> {
        Ok(self.event(id))
    }
}

impl MemoryEventStore {
    fn finish(
        &self,
        id: &str,
        status: EventStatus,
        error_message: Option<String>,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError> {
        let mut events = self.events.lock().unwrap();
        match events.get_mut(id) {
            Some(event) if event.status == EventStatus::Processing => {
                event.status = status;
                event.error_message = error_message;
                event.processing_time_ms = Some(processing_time_ms);
                event.retry_count = attempts.saturating_sub(1);
                Ok(())
            }
            _ => Err(BridgeError::Internal(format!(
                "event `{id}` is not processing; refusing status transition"
            ))),
        }
    }
}

/// Conversation store backed by vectors, preserving append order.
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
    messages: Mutex<Vec<StoredMessage>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_messages(&self) -> Vec<StoredMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn drop_conversation(&self, id: &str) {
        self.conversations.lock().unwrap().remove(id);
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), BridgeError> {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, BridgeError> {
        Ok(self.conversations.lock().unwrap().get(id).cloned())
    }

    async fn append_message(&self, message: &StoredMessage) -> Result<(), BridgeError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, BridgeError> {
        let all = self.messages.lock().unwrap();
        let matching: Vec<_> = all
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit as usize);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn message_count(&self, conversation_id: &str) -> Result<i64, BridgeError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .count() as i64)
    }
}
