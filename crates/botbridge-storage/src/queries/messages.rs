// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log per conversation.

use rusqlite::params;
use rusqlite::types::Type;

use botbridge_core::{BridgeError, StoredMessage};

use crate::database::Database;

pub async fn append(db: &Database, message: &StoredMessage) -> Result<(), BridgeError> {
    let message = message.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.conversation_id,
                message.role.to_string(),
                message.content,
                message.metadata,
                message.created_at,
            ],
        )?;
        Ok(())
    })
    .await
}

/// Most recent `limit` messages, returned oldest first.
pub async fn recent(
    db: &Database,
    conversation_id: &str,
    limit: i64,
) -> Result<Vec<StoredMessage>, BridgeError> {
    let conversation_id = conversation_id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, role, content, metadata, created_at
             FROM messages
             WHERE conversation_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let mut rows: Vec<StoredMessage> = stmt
            .query_map(params![conversation_id, limit], |row| {
                let role: String = row.get(2)?;
                Ok(StoredMessage {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role: role.parse().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
                    content: row.get(3)?,
                    metadata: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        rows.reverse();
        Ok(rows)
    })
    .await
}

pub async fn count(db: &Database, conversation_id: &str) -> Result<i64, BridgeError> {
    let conversation_id = conversation_id.to_string();
    db.call(move |conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )
    })
    .await
}
