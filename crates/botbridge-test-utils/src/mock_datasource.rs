// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock datasource factory replaying canned rows or failures.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use botbridge_core::{BridgeError, DatasourceClient, DatasourceConfig, DatasourceFactory, Row};

/// Factory whose single client records executed SQL and replays a canned
/// result.
pub struct MockDatasourceFactory {
    client: Arc<MockDatasourceClient>,
    config: DatasourceConfig,
}

impl MockDatasourceFactory {
    pub fn returning(rows: Vec<Row>) -> Self {
        Self {
            client: Arc::new(MockDatasourceClient {
                rows,
                fail_with: None,
                executed: Mutex::new(Vec::new()),
            }),
            config: default_config(),
        }
    }

    /// Factory whose client fails every statement with a raw driver message.
    pub fn failing(message: &str) -> Self {
        Self {
            client: Arc::new(MockDatasourceClient {
                rows: Vec::new(),
                fail_with: Some(message.to_string()),
                executed: Mutex::new(Vec::new()),
            }),
            config: default_config(),
        }
    }

    /// SQL statements the client has executed, in order.
    pub fn executed(&self) -> Vec<String> {
        self.client.executed.lock().unwrap().clone()
    }
}

fn default_config() -> DatasourceConfig {
    DatasourceConfig {
        id: "mock-ds".to_string(),
        name: "mock warehouse".to_string(),
        engine: "sqlite".to_string(),
    }
}

#[async_trait]
impl DatasourceFactory for MockDatasourceFactory {
    async fn client(&self, _datasource_id: &str) -> Result<Arc<dyn DatasourceClient>, BridgeError> {
        Ok(self.client.clone())
    }

    async fn config(&self, _datasource_id: &str) -> Result<DatasourceConfig, BridgeError> {
        Ok(self.config.clone())
    }
}

pub struct MockDatasourceClient {
    rows: Vec<Row>,
    fail_with: Option<String>,
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl DatasourceClient for MockDatasourceClient {
    async fn run(&self, sql: &str) -> Result<Vec<Row>, BridgeError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(ref message) = self.fail_with {
            return Err(BridgeError::Datasource {
                message: message.clone(),
            });
        }
        Ok(self.rows.clone())
    }
}
