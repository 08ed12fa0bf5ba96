// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite datasource clients for analytics queries and actions.
//!
//! Separate from the botbridge database: each configured datasource is its
//! own SQLite file, opened lazily on first use and cached. Raw driver
//! messages are surfaced as [`BridgeError::Datasource`] so the executor layer
//! can translate them before users see anything.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::Value;

use botbridge_core::{BridgeError, DatasourceClient, DatasourceConfig, DatasourceFactory, Row};

/// One configured datasource: its public config plus the backing file.
#[derive(Debug, Clone)]
pub struct DatasourceSpec {
    pub config: DatasourceConfig,
    pub path: PathBuf,
}

/// Factory resolving datasource ids to lazily-opened SQLite clients.
pub struct SqliteDatasourceFactory {
    specs: Vec<DatasourceSpec>,
    clients: DashMap<String, Arc<SqliteDatasourceClient>>,
}

impl SqliteDatasourceFactory {
    pub fn new(specs: impl IntoIterator<Item = DatasourceSpec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
            clients: DashMap::new(),
        }
    }

    fn spec(&self, datasource_id: &str) -> Result<&DatasourceSpec, BridgeError> {
        self.specs
            .iter()
            .find(|s| s.config.id == datasource_id)
            .ok_or_else(|| {
                BridgeError::Internal(format!("datasource `{datasource_id}` is not configured"))
            })
    }
}

#[async_trait]
impl DatasourceFactory for SqliteDatasourceFactory {
    async fn client(&self, datasource_id: &str) -> Result<Arc<dyn DatasourceClient>, BridgeError> {
        if let Some(client) = self.clients.get(datasource_id) {
            return Ok(client.clone());
        }
        let spec = self.spec(datasource_id)?;
        let client = Arc::new(SqliteDatasourceClient::open(&spec.path).await?);
        self.clients
            .insert(datasource_id.to_string(), client.clone());
        Ok(client)
    }

    async fn config(&self, datasource_id: &str) -> Result<DatasourceConfig, BridgeError> {
        Ok(self.spec(datasource_id)?.config.clone())
    }
}

/// Client over one SQLite datasource file.
pub struct SqliteDatasourceClient {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatasourceClient {
    pub async fn open(path: &std::path::Path) -> Result<Self, BridgeError> {
        let path = path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || Connection::open(path))
            .await
            .map_err(|e| BridgeError::Internal(format!("datasource task panicked: {e}")))?
            .map_err(|e| BridgeError::Datasource {
                message: e.to_string(),
            })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl DatasourceClient for SqliteDatasourceClient {
    async fn run(&self, sql: &str) -> Result<Vec<Row>, BridgeError> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            run_sync(&guard, &sql)
        })
        .await
        .map_err(|e| BridgeError::Internal(format!("datasource task panicked: {e}")))?
        .map_err(|e| BridgeError::Datasource {
            message: e.to_string(),
        })
    }
}

/// Prepares and steps `sql`, collecting any returned rows as JSON objects.
///
/// Statements that return nothing (action DML) simply yield an empty set.
fn run_sync(conn: &Connection, sql: &str) -> Result<Vec<Row>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut object = Row::new();
        for (i, name) in columns.iter().enumerate() {
            object.insert(name.clone(), json_value(row.get_ref(i)?));
        }
        out.push(object);
    }
    Ok(out)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_factory(dir: &std::path::Path) -> SqliteDatasourceFactory {
        let path = dir.join("warehouse.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL);
             INSERT INTO users (name, score) VALUES ('ada', 9.5), ('lin', 7.0);",
        )
        .unwrap();

        SqliteDatasourceFactory::new([DatasourceSpec {
            config: DatasourceConfig {
                id: "ds1".into(),
                name: "warehouse".into(),
                engine: "sqlite".into(),
            },
            path,
        }])
    }

    #[tokio::test]
    async fn runs_selects_and_maps_types() {
        let dir = tempfile::tempdir().unwrap();
        let factory = seeded_factory(dir.path());

        let client = factory.client("ds1").await.unwrap();
        let rows = client
            .run("SELECT id, name, score FROM users ORDER BY id")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], serde_json::json!(1));
        assert_eq!(rows[0]["name"], serde_json::json!("ada"));
        assert_eq!(rows[0]["score"], serde_json::json!(9.5));
    }

    #[tokio::test]
    async fn driver_errors_carry_raw_message() {
        let dir = tempfile::tempdir().unwrap();
        let factory = seeded_factory(dir.path());

        let client = factory.client("ds1").await.unwrap();
        let err = client.run("SELECT * FROM missing").await.unwrap_err();
        match err {
            BridgeError::Datasource { message } => {
                assert!(message.contains("no such table"), "got: {message}")
            }
            other => panic!("expected Datasource error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_datasource_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let factory = seeded_factory(dir.path());

        assert!(factory.client("nope").await.is_err());
        assert!(factory.config("nope").await.is_err());
    }

    #[tokio::test]
    async fn clients_are_cached_per_datasource() {
        let dir = tempfile::tempdir().unwrap();
        let factory = seeded_factory(dir.path());

        let a = factory.client("ds1").await.unwrap();
        let b = factory.client("ds1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
