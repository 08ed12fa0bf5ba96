// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query path: conversation resolution, context rendering, execution, and
//! persistence of both turns.

use std::sync::Arc;

use botbridge_conversation::{ContextOptions, ConversationTracker, format_context_for_prompt};
use botbridge_core::{Bot, BotEvent, BridgeError};

use crate::format::format_query_response;
use crate::processor::ProcessReply;
use crate::service::{QueryRequest, QueryService};

/// Context window sizing for prompt rendering.
#[derive(Debug, Clone, Copy)]
pub struct ContextSettings {
    pub max_messages: i64,
    pub token_budget: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_messages: 20,
            token_budget: 512,
        }
    }
}

/// Handles events classified as ad-hoc data questions.
pub struct BotQueryProcessor {
    tracker: Arc<ConversationTracker>,
    service: Arc<dyn QueryService>,
    context: ContextSettings,
    row_limit: u64,
}

impl BotQueryProcessor {
    pub fn new(
        tracker: Arc<ConversationTracker>,
        service: Arc<dyn QueryService>,
        context: ContextSettings,
        row_limit: u64,
    ) -> Self {
        Self {
            tracker,
            service,
            context,
            row_limit,
        }
    }

    /// Resolves the conversation, renders the prompt context, and records
    /// the user's turn. Runs once per event, before any retries, so a
    /// retried execution never re-appends the question.
    pub async fn begin_turn(&self, bot: &Bot, event: &BotEvent) -> Result<QueryTurn, BridgeError> {
        if !bot.enable_query {
            return Err(BridgeError::QueryDisabled {
                bot_id: bot.id.clone(),
            });
        }

        let conversation = self
            .tracker
            .get_or_create(bot, &event.external_user_id, event.internal_user_id.as_deref())
            .await?;

        let window = self
            .tracker
            .get_context(
                &conversation.id,
                ContextOptions {
                    max_messages: self.context.max_messages,
                    include_metadata: false,
                },
            )
            .await?;
        let context = format_context_for_prompt(&window, self.context.token_budget);

        self.tracker
            .record_user_message(&conversation.id, &event.content, None)
            .await?;

        Ok(QueryTurn {
            conversation_id: conversation.id,
            context,
        })
    }

    /// Executes the question and records the formatted answer, carrying the
    /// executed SQL as metadata. Safe to retry: it only ever appends the
    /// assistant turn of a successful pass.
    pub async fn run_turn(
        &self,
        bot: &Bot,
        event: &BotEvent,
        turn: &QueryTurn,
    ) -> Result<ProcessReply, BridgeError> {
        let request = QueryRequest {
            question: event.content.clone(),
            ai_provider: bot.ai_provider_id.clone(),
            limit: self.row_limit,
        };
        let response = self.service.run_query(bot, &request, &turn.context).await?;

        let text = format_query_response(&response);
        let metadata = response
            .sql
            .as_ref()
            .map(|sql| serde_json::json!({ "sql": sql }).to_string());
        self.tracker
            .record_bot_response(&turn.conversation_id, &text, metadata)
            .await?;

        Ok(ProcessReply {
            text,
            response: Some(response),
        })
    }

    /// Full query path as one call: begin the turn, then run it.
    pub async fn process_query(
        &self,
        bot: &Bot,
        event: &BotEvent,
    ) -> Result<ProcessReply, BridgeError> {
        let turn = self.begin_turn(bot, event).await?;
        self.run_turn(bot, event, &turn).await
    }
}

/// Conversation state resolved by [`BotQueryProcessor::begin_turn`].
pub struct QueryTurn {
    conversation_id: String,
    context: String,
}
