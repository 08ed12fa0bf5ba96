// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics query seam.
//!
//! The pipeline hands natural-language questions to a [`QueryService`]; what
//! sits behind it (an AI SQL engine, a template catalog) is a deployment
//! choice. [`DirectSqlQueryService`] is the built-in implementation: it runs
//! questions that already are read-only SQL and declines everything else.

use std::sync::Arc;

use async_trait::async_trait;

use botbridge_core::{Bot, BridgeError, QueryResponse};
use botbridge_query::{ExecuteOptions, QueryExecutor, SqlSnippet, ensure_read_only};

/// One analytics question on behalf of a bot.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub question: String,
    /// Provider hint forwarded to AI-backed services; unused by the direct
    /// implementation.
    pub ai_provider: Option<String>,
    /// Row cap injected into statements without a LIMIT.
    pub limit: u64,
}

/// Turns a question into rows. `context` is the rendered conversation
/// window, for services that condition on history.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn run_query(
        &self,
        bot: &Bot,
        request: &QueryRequest,
        context: &str,
    ) -> Result<QueryResponse, BridgeError>;
}

/// Executes questions that are themselves read-only SQL against the bot's
/// default datasource.
pub struct DirectSqlQueryService {
    executor: Arc<QueryExecutor>,
}

impl DirectSqlQueryService {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl QueryService for DirectSqlQueryService {
    async fn run_query(
        &self,
        bot: &Bot,
        request: &QueryRequest,
        _context: &str,
    ) -> Result<QueryResponse, BridgeError> {
        let datasource_id = bot
            .default_datasource_id
            .clone()
            .or_else(|| bot.enabled_datasources.first().cloned())
            .ok_or_else(|| {
                BridgeError::Execution(format!("bot `{}` has no datasource configured", bot.id))
            })?;

        if ensure_read_only(&request.question).is_err() {
            return Err(BridgeError::Execution(
                "no analytics provider is configured; only read-only SQL questions can be answered"
                    .to_string(),
            ));
        }

        self.executor
            .execute(
                &[SqlSnippet {
                    sql: request.question.clone(),
                    datasource_id,
                }],
                ExecuteOptions {
                    limit: Some(request.limit),
                },
            )
            .await
    }
}
