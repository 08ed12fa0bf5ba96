// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the botbridge pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the botbridge workspace. Platform adapters,
//! datasource factories, and persistence collaborators all implement traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BridgeError, ErrorCode};
pub use traits::{
    AdapterRegistry, ConversationStore, DatasourceClient, DatasourceConfig, DatasourceFactory,
    EventStore, PlatformAdapter,
};
pub use types::{
    Action, Bot, BotEvent, Conversation, EventStatus, InputSchema, Intent, IntentResult,
    ParameterSpec, ParamType, ParsedMessage, QueryResponse, Role, Row, StoredMessage,
};
