// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot event operations: insert plus the forward-only status transitions.

use rusqlite::params;
use rusqlite::types::Type;

use botbridge_core::{BotEvent, BridgeError, EventStatus};

use crate::database::Database;

/// Persist a new event. The caller sets status; ingress always inserts
/// `pending`.
pub async fn insert(db: &Database, event: &BotEvent) -> Result<(), BridgeError> {
    let event = event.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO bot_events (id, bot_id, external_event_id, content,
                 external_user_id, external_user_name, internal_user_id,
                 status, retry_count, max_retries, error_message,
                 processing_time_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                event.id,
                event.bot_id,
                event.external_event_id,
                event.content,
                event.external_user_id,
                event.external_user_name,
                event.internal_user_id,
                event.status.to_string(),
                event.retry_count,
                event.max_retries,
                event.error_message,
                event.processing_time_ms,
                event.created_at,
            ],
        )?;
        Ok(())
    })
    .await
}

/// Advance `pending` -> `processing`. Errors if the event is missing or not
/// pending; the state machine never moves backward.
pub async fn mark_processing(db: &Database, id: &str) -> Result<(), BridgeError> {
    let id = id.to_string();
    let updated = db
        .call({
            let id = id.clone();
            move |conn| {
                conn.execute(
                    "UPDATE bot_events SET status = 'processing'
                     WHERE id = ?1 AND status = 'pending'",
                    params![id],
                )
            }
        })
        .await?;
    if updated == 0 {
        return Err(BridgeError::Internal(format!(
            "event `{id}` is not pending; refusing status transition"
        )));
    }
    Ok(())
}

/// Terminal success from `processing`.
pub async fn mark_completed(
    db: &Database,
    id: &str,
    processing_time_ms: u64,
    attempts: u32,
) -> Result<(), BridgeError> {
    finish(db, id, EventStatus::Completed, None, processing_time_ms, attempts).await
}

/// Terminal failure from `processing`, with the error recorded.
pub async fn mark_failed(
    db: &Database,
    id: &str,
    error_message: &str,
    processing_time_ms: u64,
    attempts: u32,
) -> Result<(), BridgeError> {
    finish(
        db,
        id,
        EventStatus::Failed,
        Some(error_message.to_string()),
        processing_time_ms,
        attempts,
    )
    .await
}

async fn finish(
    db: &Database,
    id: &str,
    status: EventStatus,
    error_message: Option<String>,
    processing_time_ms: u64,
    attempts: u32,
) -> Result<(), BridgeError> {
    let id = id.to_string();
    let retry_count = attempts.saturating_sub(1);
    let updated = db
        .call({
            let id = id.clone();
            move |conn| {
                conn.execute(
                    "UPDATE bot_events SET status = ?2, error_message = ?3,
                         processing_time_ms = ?4, retry_count = ?5
                     WHERE id = ?1 AND status = 'processing'",
                    params![
                        id,
                        status.to_string(),
                        error_message,
                        processing_time_ms,
                        retry_count,
                    ],
                )
            }
        })
        .await?;
    if updated == 0 {
        return Err(BridgeError::Internal(format!(
            "event `{id}` is not processing; refusing status transition"
        )));
    }
    Ok(())
}

pub async fn get(db: &Database, id: &str) -> Result<Option<BotEvent>, BridgeError> {
    let id = id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, bot_id, external_event_id, content, external_user_id,
                    external_user_name, internal_user_id, status, retry_count,
                    max_retries, error_message, processing_time_ms, created_at
             FROM bot_events WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![id], |row| {
            let status: String = row.get(7)?;
            Ok(BotEvent {
                id: row.get(0)?,
                bot_id: row.get(1)?,
                external_event_id: row.get(2)?,
                content: row.get(3)?,
                external_user_id: row.get(4)?,
                external_user_name: row.get(5)?,
                internal_user_id: row.get(6)?,
                status: status.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
                })?,
                retry_count: row.get(8)?,
                max_retries: row.get(9)?,
                error_message: row.get(10)?,
                processing_time_ms: row.get(11)?,
                created_at: row.get(12)?,
            })
        });
        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}
