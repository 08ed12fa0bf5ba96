// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Datasource access seams injected into the executors.
//!
//! The persistence collaborator provides both factories; the executors treat
//! clients and configs as opaque.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::Row;

/// Resolved datasource metadata returned by the factory.
#[derive(Debug, Clone)]
pub struct DatasourceConfig {
    pub id: String,
    pub name: String,
    /// Engine tag used for driver-error translation ("sqlite", "mysql", ...).
    pub engine: String,
}

/// A live client for one datasource.
///
/// Errors surface as [`BridgeError::Datasource`] carrying the raw driver
/// message; the executor translates these into domain errors.
#[async_trait]
pub trait DatasourceClient: Send + Sync {
    async fn run(&self, sql: &str) -> Result<Vec<Row>, BridgeError>;
}

/// Factory resolving datasource ids into clients and resolved configs.
#[async_trait]
pub trait DatasourceFactory: Send + Sync {
    async fn client(&self, datasource_id: &str) -> Result<Arc<dyn DatasourceClient>, BridgeError>;

    async fn config(&self, datasource_id: &str) -> Result<DatasourceConfig, BridgeError>;
}
