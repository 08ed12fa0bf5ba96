// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action path: enablement check, parameter extraction, execution.

use botbridge_core::{Action, Bot, BotEvent, BridgeError};
use botbridge_intent::ParameterExtractor;
use botbridge_query::ActionExecutor;

use crate::format::format_query_response;
use crate::processor::ProcessReply;

/// Handles events classified as invocations of a declared action.
pub struct BotActionRunner {
    extractor: ParameterExtractor,
    executor: ActionExecutor,
}

impl BotActionRunner {
    pub fn new(executor: ActionExecutor) -> Self {
        Self {
            extractor: ParameterExtractor::new(),
            executor,
        }
    }

    /// Extracts parameters from the event text and executes the action's
    /// stored payload. Guard rejections and network failures keep their
    /// shape; everything else surfaces as an execution error.
    pub async fn run(
        &self,
        bot: &Bot,
        event: &BotEvent,
        action: &Action,
    ) -> Result<ProcessReply, BridgeError> {
        if !bot.enabled_actions.contains(&action.id) {
            return Err(BridgeError::ActionNotEnabled {
                action_id: action.id.clone(),
                bot_id: bot.id.clone(),
            });
        }

        let extraction = self.extractor.extract(&event.content, action);
        for warning in &extraction.warnings {
            tracing::debug!(action = action.id.as_str(), warning, "parameter extraction");
        }

        let response = self
            .executor
            .execute(action, &extraction.parameters)
            .await
            .map_err(|e| match e {
                e @ (BridgeError::SqlRejected(_)
                | BridgeError::Network(_)
                | BridgeError::Timeout { .. }
                | BridgeError::Execution(_)) => e,
                other => BridgeError::Execution(other.to_string()),
            })?;

        Ok(ProcessReply {
            text: format_query_response(&response),
            response: Some(response),
        })
    }
}
