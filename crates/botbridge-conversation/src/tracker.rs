// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation threading per (bot, external user) pair.
//!
//! An in-process cache maps `"{bot_id}:{external_user_id}"` to a conversation
//! id so rapid repeated messages from the same user land in one thread
//! instead of racing lookup/create into duplicates. The row is created before
//! the cache entry; a lost race costs one extra conversation row, never a
//! correctness failure. Cache entries are dropped when the backing
//! conversation can no longer be read.

use std::sync::Arc;

use dashmap::DashMap;

use botbridge_core::{Bot, BridgeError, Conversation, ConversationStore, Role, StoredMessage};

/// Window options for [`ConversationTracker::get_context`].
#[derive(Debug, Clone, Copy)]
pub struct ContextOptions {
    /// Most recent N messages to include.
    pub max_messages: i64,
    /// Keep per-message metadata in the returned window.
    pub include_metadata: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_messages: 20,
            include_metadata: false,
        }
    }
}

/// A conversation's recent window plus its total turn count.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub conversation_id: String,
    /// Chronological, oldest first.
    pub messages: Vec<StoredMessage>,
    pub total_count: i64,
}

/// Tracker owning the conversation cache and the append-only turn log.
pub struct ConversationTracker {
    store: Arc<dyn ConversationStore>,
    cache: DashMap<String, String>,
}

impl ConversationTracker {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Resolves the conversation for this user on this bot, creating one on
    /// first contact.
    pub async fn get_or_create(
        &self,
        bot: &Bot,
        external_user_id: &str,
        internal_user_id: Option<&str>,
    ) -> Result<Conversation, BridgeError> {
        let key = cache_key(&bot.id, external_user_id);

        if let Some(cached_id) = self.cache.get(&key).map(|e| e.value().clone()) {
            match self.store.get_conversation(&cached_id).await? {
                Some(conversation) => return Ok(conversation),
                None => {
                    tracing::debug!(
                        conversation_id = cached_id.as_str(),
                        "cached conversation no longer readable, invalidating"
                    );
                    self.cache.remove(&key);
                }
            }
        }

        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: internal_user_id.unwrap_or(external_user_id).to_string(),
            title: format!("{} / {external_user_id}", bot.name),
            created_at: now(),
        };
        self.store.create_conversation(&conversation).await?;
        self.cache.insert(key, conversation.id.clone());
        Ok(conversation)
    }

    /// Most recent window in chronological order, plus the total count.
    pub async fn get_context(
        &self,
        conversation_id: &str,
        opts: ContextOptions,
    ) -> Result<ConversationContext, BridgeError> {
        let mut messages = self
            .store
            .recent_messages(conversation_id, opts.max_messages)
            .await?;
        if !opts.include_metadata {
            for message in &mut messages {
                message.metadata = None;
            }
        }
        let total_count = self.store.message_count(conversation_id).await?;
        Ok(ConversationContext {
            conversation_id: conversation_id.to_string(),
            messages,
            total_count,
        })
    }

    pub async fn record_user_message(
        &self,
        conversation_id: &str,
        content: &str,
        metadata: Option<String>,
    ) -> Result<(), BridgeError> {
        self.append(conversation_id, Role::User, content, metadata).await
    }

    pub async fn record_bot_response(
        &self,
        conversation_id: &str,
        content: &str,
        metadata: Option<String>,
    ) -> Result<(), BridgeError> {
        self.append(conversation_id, Role::Assistant, content, metadata)
            .await
    }

    async fn append(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        metadata: Option<String>,
    ) -> Result<(), BridgeError> {
        self.store
            .append_message(&StoredMessage {
                id: uuid::Uuid::new_v4().to_string(),
                conversation_id: conversation_id.to_string(),
                role,
                content: content.to_string(),
                metadata,
                created_at: now(),
            })
            .await
    }
}

/// Renders the window oldest-to-newest as `"{Role}: {content}"` lines,
/// stopping once a 4-chars-per-token estimate would exceed the budget.
/// Returns an empty string when not even the first line fits.
pub fn format_context_for_prompt(context: &ConversationContext, max_token_estimate: usize) -> String {
    let mut out = String::new();
    let mut used_tokens = 0usize;

    for message in &context.messages {
        let line = format!("{}: {}\n", role_label(message.role), message.content);
        let line_tokens = line.chars().count().div_ceil(4);
        if used_tokens + line_tokens > max_token_estimate {
            break;
        }
        out.push_str(&line);
        used_tokens += line_tokens;
    }

    out
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
        Role::System => "System",
    }
}

fn cache_key(bot_id: &str, external_user_id: &str) -> String {
    format!("{bot_id}:{external_user_id}")
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
