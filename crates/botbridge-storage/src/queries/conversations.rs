// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation rows. CRUD only; threading semantics live in the tracker.

use rusqlite::params;

use botbridge_core::{BridgeError, Conversation};

use crate::database::Database;

pub async fn insert(db: &Database, conversation: &Conversation) -> Result<(), BridgeError> {
    let conversation = conversation.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO conversations (id, user_id, title, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                conversation.id,
                conversation.user_id,
                conversation.title,
                conversation.created_at,
            ],
        )?;
        Ok(())
    })
    .await
}

pub async fn get(db: &Database, id: &str) -> Result<Option<Conversation>, BridgeError> {
    let id = id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, created_at FROM conversations WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![id], |row| {
            Ok(Conversation {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                created_at: row.get(3)?,
            })
        });
        match result {
            Ok(conversation) => Ok(Some(conversation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}
