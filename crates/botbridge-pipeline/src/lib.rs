// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event processing pipeline.
//!
//! Webhook ingress enqueues [`worker::WorkItem`]s; the worker pool drives
//! each one through [`processor::BotProcessor`], which classifies the text,
//! routes to the query or action path under the retry engine, settles the
//! event record, and replies through the platform adapter.

pub mod action_runner;
pub mod format;
pub mod processor;
pub mod query_processor;
pub mod retry;
pub mod service;
pub mod worker;

pub use action_runner::BotActionRunner;
pub use format::format_query_response;
pub use processor::{BotProcessor, ProcessReply, ProcessSummary};
pub use query_processor::{BotQueryProcessor, ContextSettings, QueryTurn};
pub use retry::{ClassifiedError, RetryEngine, RetryPolicy, RetryReport, is_network_error};
pub use service::{DirectSqlQueryService, QueryRequest, QueryService};
pub use worker::{QueueFull, WorkItem, WorkQueue, WorkerPool};
