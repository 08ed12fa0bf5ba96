// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query and action executors.
//!
//! Both resolve clients and configs through the injected
//! [`DatasourceFactory`], bound the SQL through the guard, and accumulate
//! result rows. Driver failures are translated before they propagate.

use std::sync::Arc;

use serde_json::Value;

use botbridge_core::{Action, BridgeError, DatasourceFactory, QueryResponse};

use crate::errors::translate_driver_error;
use crate::guard;

/// One SQL snippet bound to a datasource.
#[derive(Debug, Clone)]
pub struct SqlSnippet {
    pub sql: String,
    pub datasource_id: String,
}

/// Execution options for ad-hoc queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// LIMIT injected into statements without one.
    pub limit: Option<u64>,
}

/// Runs read-only SQL snippets and aggregates their rows.
pub struct QueryExecutor {
    factory: Arc<dyn DatasourceFactory>,
}

impl QueryExecutor {
    pub fn new(factory: Arc<dyn DatasourceFactory>) -> Self {
        Self { factory }
    }

    /// Executes each snippet in order: resolve client and config, apply the
    /// limit, run the read-only guard, execute, append rows.
    pub async fn execute(
        &self,
        snippets: &[SqlSnippet],
        opts: ExecuteOptions,
    ) -> Result<QueryResponse, BridgeError> {
        let mut response = QueryResponse::default();

        for snippet in snippets {
            let client = self.factory.client(&snippet.datasource_id).await?;
            let config = self.factory.config(&snippet.datasource_id).await?;

            let sql = match opts.limit {
                Some(limit) => guard::apply_limit(&snippet.sql, limit),
                None => snippet.sql.clone(),
            };
            guard::ensure_read_only(&sql)?;

            tracing::debug!(
                datasource = config.id.as_str(),
                sql = sql.as_str(),
                "executing query snippet"
            );

            let mut rows = client
                .run(&sql)
                .await
                .map_err(|e| translate_driver_error(e, &config))?;
            response.rows.append(&mut rows);
            response.sql = Some(sql);
        }

        Ok(response)
    }
}

/// Runs admin-authored action templates with extracted parameters.
pub struct ActionExecutor {
    factory: Arc<dyn DatasourceFactory>,
}

impl ActionExecutor {
    pub fn new(factory: Arc<dyn DatasourceFactory>) -> Self {
        Self { factory }
    }

    /// Renders the action payload with parameters, runs the action guard,
    /// and executes against the action's datasource.
    pub async fn execute(
        &self,
        action: &Action,
        parameters: &serde_json::Map<String, Value>,
    ) -> Result<QueryResponse, BridgeError> {
        let sql = render_payload(&action.payload, parameters)?;
        guard::ensure_action_safe(&sql)?;

        let client = self.factory.client(&action.datasource_id).await?;
        let config = self.factory.config(&action.datasource_id).await?;

        tracing::debug!(
            action = action.id.as_str(),
            datasource = config.id.as_str(),
            "executing action"
        );

        let rows = client
            .run(&sql)
            .await
            .map_err(|e| translate_driver_error(e, &config))?;

        Ok(QueryResponse {
            rows,
            sql: Some(sql),
            summary: None,
        })
    }
}

/// Fills `{{name}}` placeholders with SQL literals.
///
/// Strings are single-quoted with doubled-quote escaping; numbers and
/// booleans render bare; null renders as NULL. An unfilled placeholder is an
/// execution error rather than a silent empty substitution.
pub fn render_payload(
    payload: &str,
    parameters: &serde_json::Map<String, Value>,
) -> Result<String, BridgeError> {
    let mut sql = payload.to_string();
    for (name, value) in parameters {
        let literal = match value {
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Null => "NULL".to_string(),
            other => {
                return Err(BridgeError::Execution(format!(
                    "parameter `{name}` has unsupported shape: {other}"
                )));
            }
        };
        sql = sql.replace(&format!("{{{{{name}}}}}"), &literal);
    }

    if let Some(start) = sql.find("{{") {
        let end = sql[start..].find("}}").map(|i| start + i + 2).unwrap_or(sql.len());
        return Err(BridgeError::Execution(format!(
            "missing parameter for placeholder {}",
            &sql[start..end]
        )));
    }

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use botbridge_core::{DatasourceClient, DatasourceConfig, Row};
    use std::sync::Mutex;

    /// Records executed SQL and replays canned results.
    struct FakeDatasource {
        executed: Mutex<Vec<String>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl DatasourceClient for FakeDatasource {
        async fn run(&self, sql: &str) -> Result<Vec<Row>, BridgeError> {
            self.executed.lock().unwrap().push(sql.to_string());
            if let Some(ref message) = self.fail_with {
                return Err(BridgeError::Datasource {
                    message: message.clone(),
                });
            }
            let mut row = Row::new();
            row.insert("n".into(), serde_json::json!(1));
            Ok(vec![row])
        }
    }

    struct FakeFactory {
        client: Arc<FakeDatasource>,
    }

    #[async_trait]
    impl DatasourceFactory for FakeFactory {
        async fn client(
            &self,
            _datasource_id: &str,
        ) -> Result<Arc<dyn DatasourceClient>, BridgeError> {
            Ok(self.client.clone())
        }

        async fn config(&self, datasource_id: &str) -> Result<DatasourceConfig, BridgeError> {
            Ok(DatasourceConfig {
                id: datasource_id.to_string(),
                name: "warehouse".into(),
                engine: "sqlite".into(),
            })
        }
    }

    fn factory(fail_with: Option<&str>) -> (Arc<FakeFactory>, Arc<FakeDatasource>) {
        let client = Arc::new(FakeDatasource {
            executed: Mutex::new(Vec::new()),
            fail_with: fail_with.map(String::from),
        });
        (
            Arc::new(FakeFactory {
                client: client.clone(),
            }),
            client,
        )
    }

    fn snippet(sql: &str) -> SqlSnippet {
        SqlSnippet {
            sql: sql.to_string(),
            datasource_id: "ds1".to_string(),
        }
    }

    #[tokio::test]
    async fn query_executor_applies_limit_and_aggregates_rows() {
        let (factory, client) = factory(None);
        let executor = QueryExecutor::new(factory);

        let response = executor
            .execute(
                &[snippet("SELECT * FROM a"), snippet("SELECT * FROM b LIMIT 3")],
                ExecuteOptions { limit: Some(10) },
            )
            .await
            .unwrap();

        assert_eq!(response.rows.len(), 2, "one row per snippet");
        let executed = client.executed.lock().unwrap();
        assert_eq!(executed[0], "SELECT * FROM a LIMIT 10");
        assert_eq!(executed[1], "SELECT * FROM b LIMIT 3", "existing LIMIT kept");
    }

    #[tokio::test]
    async fn query_executor_rejects_unsafe_sql_before_execution() {
        let (factory, client) = factory(None);
        let executor = QueryExecutor::new(factory);

        let result = executor
            .execute(&[snippet("DELETE FROM users")], ExecuteOptions::default())
            .await;
        assert!(matches!(result, Err(BridgeError::SqlRejected(_))));
        assert!(
            client.executed.lock().unwrap().is_empty(),
            "guard must fire before the datasource sees the SQL"
        );
    }

    #[tokio::test]
    async fn driver_errors_are_translated() {
        let (factory, _client) = factory(Some("no such table: users"));
        let executor = QueryExecutor::new(factory);

        let err = executor
            .execute(&[snippet("SELECT * FROM users")], ExecuteOptions::default())
            .await
            .unwrap_err();
        match err {
            BridgeError::Execution(message) => {
                assert!(message.contains("table not found"), "got: {message}")
            }
            other => panic!("expected Execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn action_executor_renders_parameters() {
        let (factory, client) = factory(None);
        let executor = ActionExecutor::new(factory);

        let action = Action {
            id: "a1".into(),
            name: "audit".into(),
            description: None,
            action_type: "sql".into(),
            payload: "INSERT INTO audit (who, note) VALUES ({{who}}, {{note}})".into(),
            datasource_id: "ds1".into(),
            input_schema: None,
        };
        let mut params = serde_json::Map::new();
        params.insert("who".into(), serde_json::json!("o'brien"));
        params.insert("note".into(), serde_json::json!(42));

        executor.execute(&action, &params).await.unwrap();

        let executed = client.executed.lock().unwrap();
        assert_eq!(
            executed[0],
            "INSERT INTO audit (who, note) VALUES ('o''brien', 42)"
        );
    }

    #[tokio::test]
    async fn action_executor_blocks_ddl_payloads() {
        let (factory, _client) = factory(None);
        let executor = ActionExecutor::new(factory);

        let action = Action {
            id: "a1".into(),
            name: "bad".into(),
            description: None,
            action_type: "sql".into(),
            payload: "DROP TABLE users".into(),
            datasource_id: "ds1".into(),
            input_schema: None,
        };
        let result = executor.execute(&action, &serde_json::Map::new()).await;
        assert!(matches!(result, Err(BridgeError::SqlRejected(_))));
    }

    #[test]
    fn render_payload_reports_missing_placeholders() {
        let err =
            render_payload("SELECT * FROM t WHERE id = {{id}}", &serde_json::Map::new())
                .unwrap_err();
        assert!(err.to_string().contains("{{id}}"));
    }
}
