// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mocks and in-memory stores for deterministic botbridge tests.

pub mod memory_store;
pub mod mock_adapter;
pub mod mock_datasource;

pub use memory_store::{MemoryConversationStore, MemoryEventStore};
pub use mock_adapter::MockAdapter;
pub use mock_datasource::MockDatasourceFactory;
