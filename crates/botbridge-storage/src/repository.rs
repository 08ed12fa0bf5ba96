// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`EventStore`] and [`ConversationStore`] over the SQLite database.

use async_trait::async_trait;

use botbridge_core::{
    BotEvent, BridgeError, Conversation, ConversationStore, EventStore, StoredMessage,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed implementation of both persistence contracts.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert_event(&self, event: &BotEvent) -> Result<(), BridgeError> {
        queries::events::insert(&self.db, event).await
    }

    async fn mark_processing(&self, id: &str) -> Result<(), BridgeError> {
        queries::events::mark_processing(&self.db, id).await
    }

    async fn mark_completed(
        &self,
        id: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError> {
        queries::events::mark_completed(&self.db, id, processing_time_ms, attempts).await
    }

    async fn mark_failed(
        &self,
        id: &str,
        error_message: &str,
        processing_time_ms: u64,
        attempts: u32,
    ) -> Result<(), BridgeError> {
        queries::events::mark_failed(&self.db, id, error_message, processing_time_ms, attempts)
            .await
    }

    async fn get_event(&self, id: &str) -> Result<Option<BotEvent>, BridgeError> {
        queries::events::get(&self.db, id).await
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), BridgeError> {
        queries::conversations::insert(&self.db, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, BridgeError> {
        queries::conversations::get(&self.db, id).await
    }

    async fn append_message(&self, message: &StoredMessage) -> Result<(), BridgeError> {
        queries::messages::append(&self.db, message).await
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, BridgeError> {
        queries::messages::recent(&self.db, conversation_id, limit).await
    }

    async fn message_count(&self, conversation_id: &str) -> Result<i64, BridgeError> {
        queries::messages::count(&self.db, conversation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbridge_core::{EventStatus, Role};

    fn event(id: &str) -> BotEvent {
        BotEvent {
            id: id.into(),
            bot_id: "b1".into(),
            external_event_id: "ext-1".into(),
            content: "how many users".into(),
            external_user_id: "u1".into(),
            external_user_name: Some("Pat".into()),
            internal_user_id: None,
            status: EventStatus::Pending,
            retry_count: 0,
            max_retries: 3,
            error_message: None,
            processing_time_ms: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    fn message(id: &str, conversation_id: &str, role: Role, at: &str) -> StoredMessage {
        StoredMessage {
            id: id.into(),
            conversation_id: conversation_id.into(),
            role,
            content: format!("turn {id}"),
            metadata: None,
            created_at: at.into(),
        }
    }

    async fn store() -> SqliteStore {
        SqliteStore::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn event_lifecycle_pending_processing_completed() {
        let store = store().await;
        store.insert_event(&event("e1")).await.unwrap();
        store.mark_processing("e1").await.unwrap();
        store.mark_completed("e1", 42, 1).await.unwrap();

        let stored = store.get_event("e1").await.unwrap().unwrap();
        assert_eq!(stored.status, EventStatus::Completed);
        assert_eq!(stored.processing_time_ms, Some(42));
        assert_eq!(stored.retry_count, 0);
    }

    #[tokio::test]
    async fn failure_records_error_and_attempts() {
        let store = store().await;
        store.insert_event(&event("e1")).await.unwrap();
        store.mark_processing("e1").await.unwrap();
        store.mark_failed("e1", "adapter unreachable", 900, 4).await.unwrap();

        let stored = store.get_event("e1").await.unwrap().unwrap();
        assert_eq!(stored.status, EventStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("adapter unreachable"));
        assert_eq!(stored.retry_count, 3);
    }

    #[tokio::test]
    async fn status_machine_never_moves_backward() {
        let store = store().await;
        store.insert_event(&event("e1")).await.unwrap();
        store.mark_processing("e1").await.unwrap();
        store.mark_completed("e1", 1, 1).await.unwrap();

        assert!(store.mark_processing("e1").await.is_err());
        assert!(store.mark_failed("e1", "late", 1, 1).await.is_err());
    }

    #[tokio::test]
    async fn unknown_event_is_none_and_transitions_error() {
        let store = store().await;
        assert!(store.get_event("missing").await.unwrap().is_none());
        assert!(store.mark_processing("missing").await.is_err());
    }

    #[tokio::test]
    async fn recent_messages_are_chronological_and_bounded() {
        let store = store().await;
        let conversation = Conversation {
            id: "c1".into(),
            user_id: "u1".into(),
            title: "thread".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        store.create_conversation(&conversation).await.unwrap();
        for (i, role) in [Role::User, Role::Assistant, Role::User, Role::Assistant]
            .into_iter()
            .enumerate()
        {
            store
                .append_message(&message(
                    &format!("m{i}"),
                    "c1",
                    role,
                    &format!("2026-01-01T00:00:0{i}.000Z"),
                ))
                .await
                .unwrap();
        }

        let recent = store.recent_messages("c1", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        // Oldest of the kept window first.
        assert_eq!(recent[0].id, "m1");
        assert_eq!(recent[2].id, "m3");
        assert_eq!(store.message_count("c1").await.unwrap(), 4);
    }
}
