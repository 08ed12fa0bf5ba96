// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams of the pipeline.

pub mod datasource;
pub mod platform;
pub mod repository;

pub use datasource::{DatasourceClient, DatasourceConfig, DatasourceFactory};
pub use platform::{AdapterRegistry, PlatformAdapter};
pub use repository::{ConversationStore, EventStore};
