// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through a single connection behind a mutex;
//! closures run on the blocking thread pool so the async runtime never stalls
//! on SQLite I/O. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;

use botbridge_core::BridgeError;

/// Handle to the botbridge SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (creating if absent) the database at `path`, applies PRAGMAs,
    /// and ensures the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref().to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, rusqlite::Error> {
            let conn = Connection::open(path)?;
            configure(&conn)?;
            ensure_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(join_err)?
        .map_err(storage_err)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self, BridgeError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, rusqlite::Error> {
            let conn = Connection::open_in_memory()?;
            ensure_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(join_err)?
        .map_err(storage_err)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T, BridgeError>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(join_err)?
        .map_err(storage_err)
    }
}

fn configure(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    Ok(())
}

fn ensure_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bot_events (
             id                 TEXT PRIMARY KEY,
             bot_id             TEXT NOT NULL,
             external_event_id  TEXT NOT NULL,
             content            TEXT NOT NULL,
             external_user_id   TEXT NOT NULL,
             external_user_name TEXT,
             internal_user_id   TEXT,
             status             TEXT NOT NULL DEFAULT 'pending',
             retry_count        INTEGER NOT NULL DEFAULT 0,
             max_retries        INTEGER NOT NULL DEFAULT 3,
             error_message      TEXT,
             processing_time_ms INTEGER,
             created_at         TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_bot_events_bot_status
             ON bot_events (bot_id, status);

         CREATE TABLE IF NOT EXISTS conversations (
             id         TEXT PRIMARY KEY,
             user_id    TEXT NOT NULL,
             title      TEXT NOT NULL,
             created_at TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS messages (
             id              TEXT PRIMARY KEY,
             conversation_id TEXT NOT NULL REFERENCES conversations(id),
             role            TEXT NOT NULL,
             content         TEXT NOT NULL,
             metadata        TEXT,
             created_at      TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_messages_conversation
             ON messages (conversation_id, created_at);",
    )
}

pub(crate) fn storage_err(e: rusqlite::Error) -> BridgeError {
    BridgeError::Storage {
        source: Box::new(e),
    }
}

fn join_err(e: tokio::task::JoinError) -> BridgeError {
    BridgeError::Internal(format!("storage task panicked: {e}"))
}
