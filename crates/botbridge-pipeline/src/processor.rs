// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level orchestrator: one call per claimed event.
//!
//! `process` never returns an error. Every path, success or failure, yields a
//! structured summary, marks the event terminal, and tells the user what
//! happened through the platform adapter. Adapter and store failures on the
//! way out are logged, not propagated; the event outcome was already decided.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use botbridge_core::{
    Action, AdapterRegistry, Bot, BotEvent, ErrorCode, EventStore, Intent, QueryResponse,
};
use botbridge_intent::IntentDetector;

use crate::action_runner::BotActionRunner;
use crate::query_processor::BotQueryProcessor;
use crate::retry::{ClassifiedError, RetryEngine, RetryReport};

/// Successful outcome of a routed operation.
#[derive(Debug)]
pub struct ProcessReply {
    pub text: String,
    pub response: Option<QueryResponse>,
}

/// What happened to one event, for logging and tests.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub success: bool,
    pub attempts: u32,
    pub processing_time_ms: u64,
    pub code: Option<ErrorCode>,
    pub reply: Option<String>,
    pub error: Option<String>,
}

/// Routes classified events to the query or action path and settles the
/// event record either way.
pub struct BotProcessor {
    detector: IntentDetector,
    queries: BotQueryProcessor,
    actions: BotActionRunner,
    catalog: HashMap<String, Action>,
    events: Arc<dyn EventStore>,
    adapters: Arc<AdapterRegistry>,
    retry: RetryEngine,
}

impl BotProcessor {
    pub fn new(
        queries: BotQueryProcessor,
        actions: BotActionRunner,
        catalog: HashMap<String, Action>,
        events: Arc<dyn EventStore>,
        adapters: Arc<AdapterRegistry>,
        retry: RetryEngine,
    ) -> Self {
        Self {
            detector: IntentDetector::new(),
            queries,
            actions,
            catalog,
            events,
            adapters,
            retry,
        }
    }

    /// Processes one claimed event end to end.
    pub async fn process(&self, bot: &Bot, event: &BotEvent) -> ProcessSummary {
        let started = Instant::now();

        if let Err(error) = self.events.mark_processing(&event.id).await {
            warn!(event_id = event.id.as_str(), %error, "could not claim event");
            return ProcessSummary {
                success: false,
                attempts: 0,
                processing_time_ms: 0,
                code: Some(ErrorCode::ProcessingError),
                reply: None,
                error: Some(error.to_string()),
            };
        }

        let enabled: Vec<Action> = bot
            .enabled_actions
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect();
        let intent = self.detector.detect(bot, &event.content, &enabled);
        info!(
            event_id = event.id.as_str(),
            bot_id = bot.id.as_str(),
            intent = ?intent.intent,
            confidence = intent.confidence,
            reasoning = intent.reasoning.as_str(),
            "intent detected"
        );

        let report: RetryReport<ProcessReply> = match intent.intent {
            // The turn is begun once so retries of the execution step never
            // duplicate the user's message in the conversation log.
            Intent::Query => match self.queries.begin_turn(bot, event).await {
                Ok(turn) => {
                    self.retry
                        .execute_with_retry("query", || self.queries.run_turn(bot, event, &turn))
                        .await
                }
                Err(error) => RetryReport {
                    attempts: 1,
                    outcome: Err(self.retry.classify_error(&error)),
                },
            },
            Intent::Action => {
                match intent.action_id.as_ref().and_then(|id| self.catalog.get(id)) {
                    Some(action) => {
                        self.retry
                            .execute_with_retry("action", || self.actions.run(bot, event, action))
                            .await
                    }
                    None => RetryReport {
                        attempts: 1,
                        outcome: Err(ClassifiedError {
                            code: ErrorCode::ProcessingError,
                            message: "matched action is not configured".to_string(),
                            retryable: false,
                        }),
                    },
                }
            }
            Intent::Unknown => RetryReport {
                attempts: 1,
                outcome: Err(ClassifiedError {
                    code: ErrorCode::UnknownIntent,
                    message: format!("unknown intent: {}", intent.reasoning),
                    retryable: false,
                }),
            },
        };

        let processing_time_ms = started.elapsed().as_millis() as u64;
        match report.outcome {
            Ok(reply) => {
                self.deliver(bot, &event.external_user_id, &reply.text, false).await;
                if let Err(error) = self
                    .events
                    .mark_completed(&event.id, processing_time_ms, report.attempts)
                    .await
                {
                    warn!(event_id = event.id.as_str(), %error, "could not mark event completed");
                }
                ProcessSummary {
                    success: true,
                    attempts: report.attempts,
                    processing_time_ms,
                    code: None,
                    reply: Some(reply.text),
                    error: None,
                }
            }
            Err(classified) => {
                warn!(
                    event_id = event.id.as_str(),
                    code = %classified.code,
                    attempts = report.attempts,
                    error = classified.message.as_str(),
                    "event processing failed"
                );
                self.deliver(
                    bot,
                    &event.external_user_id,
                    user_facing_message(&classified),
                    true,
                )
                .await;
                if let Err(error) = self
                    .events
                    .mark_failed(&event.id, &classified.message, processing_time_ms, report.attempts)
                    .await
                {
                    warn!(event_id = event.id.as_str(), %error, "could not mark event failed");
                }
                ProcessSummary {
                    success: false,
                    attempts: report.attempts,
                    processing_time_ms,
                    code: Some(classified.code),
                    reply: None,
                    error: Some(classified.message),
                }
            }
        }
    }

    async fn deliver(&self, bot: &Bot, external_user_id: &str, text: &str, is_error: bool) {
        let adapter = match self.adapters.get(&bot.platform) {
            Ok(adapter) => adapter,
            Err(error) => {
                warn!(platform = bot.platform.as_str(), %error, "no adapter to deliver through");
                return;
            }
        };
        let sent = if is_error {
            adapter.send_error(external_user_id, text).await
        } else {
            adapter.send_reply(external_user_id, text).await
        };
        if let Err(error) = sent {
            warn!(
                platform = bot.platform.as_str(),
                external_user_id, %error, "delivery failed"
            );
        }
    }
}

fn user_facing_message(classified: &ClassifiedError) -> &'static str {
    match classified.code {
        ErrorCode::QueryDisabled => "Queries are not enabled for this bot.",
        ErrorCode::ActionNotEnabled => "That action is not enabled for this bot.",
        ErrorCode::UnknownIntent => "Sorry, I could not understand that request.",
        ErrorCode::NetworkError => "A network problem interrupted processing. Please try again.",
        ErrorCode::InvalidSql => "That query was rejected by the safety checks.",
        _ => "Something went wrong while processing your message.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use botbridge_conversation::ConversationTracker;
    use botbridge_core::{BridgeError, EventStatus, InputSchema, ParamType, ParameterSpec, Row};
    use botbridge_query::ActionExecutor;
    use botbridge_test_utils::{
        MemoryConversationStore, MemoryEventStore, MockAdapter, MockDatasourceFactory,
    };

    use crate::query_processor::ContextSettings;
    use crate::retry::RetryPolicy;
    use crate::service::{QueryRequest, QueryService};
    use async_trait::async_trait;

    /// Query service replaying a canned response or failure.
    struct StubQueryService {
        fail_with: Option<BridgeError>,
        rows: Vec<Row>,
    }

    #[async_trait]
    impl QueryService for StubQueryService {
        async fn run_query(
            &self,
            _bot: &Bot,
            request: &QueryRequest,
            _context: &str,
        ) -> Result<QueryResponse, BridgeError> {
            if let Some(ref error) = self.fail_with {
                return Err(match error {
                    BridgeError::Network(m) => BridgeError::Network(m.clone()),
                    other => BridgeError::Execution(other.to_string()),
                });
            }
            Ok(QueryResponse {
                rows: self.rows.clone(),
                sql: Some(format!("SELECT -- {}", request.question)),
                summary: None,
            })
        }
    }

    /// Query service failing a fixed number of times before succeeding.
    struct FlakyQueryService {
        failures: AtomicU32,
        rows: Vec<Row>,
    }

    #[async_trait]
    impl QueryService for FlakyQueryService {
        async fn run_query(
            &self,
            _bot: &Bot,
            _request: &QueryRequest,
            _context: &str,
        ) -> Result<QueryResponse, BridgeError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(BridgeError::Network("connection reset".into()));
            }
            Ok(QueryResponse {
                rows: self.rows.clone(),
                sql: Some("SELECT 1".into()),
                summary: None,
            })
        }
    }

    struct Fixture {
        processor: BotProcessor,
        events: Arc<MemoryEventStore>,
        adapter: Arc<MockAdapter>,
        conversations: Arc<MemoryConversationStore>,
    }

    fn count_row(n: i64) -> Row {
        let mut row = Row::new();
        row.insert("count".into(), serde_json::json!(n));
        row
    }

    fn fixture(service: impl QueryService + 'static, actions: Vec<Action>) -> Fixture {
        let events = Arc::new(MemoryEventStore::new());
        let conversations = Arc::new(MemoryConversationStore::new());
        let adapter = Arc::new(MockAdapter::new("webhook"));
        let mut registry = AdapterRegistry::new();
        registry.register(adapter.clone());

        let tracker = Arc::new(ConversationTracker::new(conversations.clone()));
        let queries = BotQueryProcessor::new(
            tracker,
            Arc::new(service),
            ContextSettings::default(),
            100,
        );
        let runner = BotActionRunner::new(ActionExecutor::new(Arc::new(
            MockDatasourceFactory::returning(vec![count_row(1)]),
        )));

        let catalog = actions.into_iter().map(|a| (a.id.clone(), a)).collect();
        let processor = BotProcessor::new(
            queries,
            runner,
            catalog,
            events.clone(),
            Arc::new(registry),
            RetryEngine::new(RetryPolicy {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 4,
                backoff_multiplier: 2.0,
            }),
        );

        Fixture {
            processor,
            events,
            adapter,
            conversations,
        }
    }

    fn bot(enable_query: bool, enabled_actions: &[&str]) -> Bot {
        Bot {
            id: "b1".into(),
            name: "metrics".into(),
            platform: "webhook".into(),
            token: "secret".into(),
            enabled_actions: enabled_actions.iter().map(|s| s.to_string()).collect(),
            enabled_datasources: vec!["mock-ds".into()],
            default_datasource_id: Some("mock-ds".into()),
            ai_provider_id: None,
            enable_query,
            is_active: true,
            max_retries: 2,
            request_timeout_ms: 30_000,
        }
    }

    fn pending_event(id: &str, content: &str) -> BotEvent {
        BotEvent {
            id: id.into(),
            bot_id: "b1".into(),
            external_event_id: format!("ext-{id}"),
            content: content.into(),
            external_user_id: "u1".into(),
            external_user_name: None,
            internal_user_id: None,
            status: EventStatus::Pending,
            retry_count: 0,
            max_retries: 2,
            error_message: None,
            processing_time_ms: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    fn greeting_action() -> Action {
        Action {
            id: "a1".into(),
            name: "daily greeting".into(),
            description: Some("send the daily greeting".into()),
            action_type: "sql".into(),
            payload: "SELECT {{count}} AS n".into(),
            datasource_id: "mock-ds".into(),
            input_schema: Some(InputSchema {
                parameters: vec![ParameterSpec {
                    name: "count".into(),
                    param_type: ParamType::Number,
                    required: false,
                    default: Some(serde_json::json!(1)),
                    description: None,
                }],
            }),
        }
    }

    #[tokio::test]
    async fn query_event_completes_and_replies() {
        let fx = fixture(
            StubQueryService {
                fail_with: None,
                rows: vec![count_row(42)],
            },
            vec![],
        );
        let bot = bot(true, &[]);
        let event = pending_event("e1", "how many signups?");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(summary.success);
        assert_eq!(summary.attempts, 1);
        let stored = fx.events.event("e1").unwrap();
        assert_eq!(stored.status, EventStatus::Completed);
        assert!(stored.processing_time_ms.is_some());

        let replies = fx.adapter.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "u1");
        assert_eq!(replies[0].1, "1. count: 42");

        // Both turns persisted.
        let messages = fx.conversations.all_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "how many signups?");
        assert_eq!(messages[1].content, "1. count: 42");
        assert!(messages[1].metadata.as_deref().unwrap().contains("SELECT"));
    }

    #[tokio::test]
    async fn query_disabled_routes_to_unknown_without_retry() {
        // With queries off and no action keyword hit, the dispatcher sends
        // the event to Unknown; the query path is never entered.
        let fx = fixture(
            StubQueryService {
                fail_with: None,
                rows: vec![],
            },
            vec![],
        );
        let bot = bot(false, &[]);
        let event = pending_event("e1", "how many signups?");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(!summary.success);
        assert_eq!(summary.attempts, 1);
        assert_eq!(summary.code, Some(ErrorCode::UnknownIntent));
        assert_eq!(fx.events.event("e1").unwrap().status, EventStatus::Failed);
        assert_eq!(fx.adapter.errors().len(), 1);
        assert!(fx.adapter.replies().is_empty());
    }

    #[tokio::test]
    async fn query_disabled_is_rejected_before_any_turn_is_recorded() {
        let conversations = Arc::new(MemoryConversationStore::new());
        let tracker = Arc::new(ConversationTracker::new(conversations.clone()));
        let queries = BotQueryProcessor::new(
            tracker,
            Arc::new(StubQueryService {
                fail_with: None,
                rows: vec![],
            }),
            ContextSettings::default(),
            100,
        );

        let error = queries
            .process_query(&bot(false, &[]), &pending_event("e1", "how many signups?"))
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::QueryDisabled { .. }));
        assert!(conversations.all_messages().is_empty());
    }

    #[tokio::test]
    async fn retries_do_not_duplicate_conversation_turns() {
        let fx = fixture(
            FlakyQueryService {
                failures: AtomicU32::new(2),
                rows: vec![count_row(7)],
            },
            vec![],
        );
        let bot = bot(true, &[]);
        let event = pending_event("e1", "what is the total?");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(summary.success);
        assert_eq!(summary.attempts, 3);
        let messages = fx.conversations.all_messages();
        assert_eq!(messages.len(), 2, "one user turn, one assistant turn");
        assert_eq!(messages[0].content, "what is the total?");
        assert_eq!(messages[1].content, "1. count: 7");
    }

    #[tokio::test]
    async fn network_failures_retry_until_exhausted() {
        let fx = fixture(
            StubQueryService {
                fail_with: Some(BridgeError::Network("ECONNREFUSED".into())),
                rows: vec![],
            },
            vec![],
        );
        let bot = bot(true, &[]);
        let event = pending_event("e1", "what is the total?");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(!summary.success);
        assert_eq!(summary.attempts, 3, "max_retries 2 means 3 attempts");
        assert_eq!(summary.code, Some(ErrorCode::NetworkError));
        let stored = fx.events.event("e1").unwrap();
        assert_eq!(stored.status, EventStatus::Failed);
        assert_eq!(stored.retry_count, 2);
    }

    #[tokio::test]
    async fn action_event_routes_to_the_runner() {
        let fx = fixture(
            StubQueryService {
                fail_with: None,
                rows: vec![],
            },
            vec![greeting_action()],
        );
        let bot = bot(true, &["a1"]);
        let event = pending_event("e1", "run the daily greeting");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(summary.success, "error: {:?}", summary.error);
        assert_eq!(fx.events.event("e1").unwrap().status, EventStatus::Completed);
        assert_eq!(fx.adapter.replies().len(), 1);
    }

    #[tokio::test]
    async fn unknown_intent_is_a_structured_failure() {
        let fx = fixture(
            StubQueryService {
                fail_with: None,
                rows: vec![],
            },
            vec![],
        );
        let bot = bot(false, &[]);
        let event = pending_event("e1", "hello there");
        fx.events.insert_event(&event).await.unwrap();

        let summary = fx.processor.process(&bot, &event).await;

        assert!(!summary.success);
        assert_eq!(summary.code, Some(ErrorCode::UnknownIntent));
        assert_eq!(summary.attempts, 1);
        assert_eq!(fx.events.event("e1").unwrap().status, EventStatus::Failed);
    }

    #[tokio::test]
    async fn missing_event_row_short_circuits() {
        let fx = fixture(
            StubQueryService {
                fail_with: None,
                rows: vec![],
            },
            vec![],
        );
        let bot = bot(true, &[]);
        let event = pending_event("never-inserted", "what is the total?");

        let summary = fx.processor.process(&bot, &event).await;

        assert!(!summary.success);
        assert_eq!(summary.attempts, 0);
        assert!(fx.adapter.replies().is_empty());
        assert!(fx.adapter.errors().is_empty());
    }
}
