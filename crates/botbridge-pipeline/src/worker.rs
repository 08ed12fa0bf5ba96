// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded worker pool for background event processing.
//!
//! Webhook ingress enqueues; N workers drain. The channel is bounded so a
//! flood of deliveries surfaces as backpressure at the HTTP edge instead of
//! unbounded task spawns. Each event is received by exactly one worker.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use botbridge_core::{Bot, BotEvent};

use crate::processor::BotProcessor;

/// One unit of background work: a claimed-pending event and its bot.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub bot: Bot,
    pub event: BotEvent,
}

/// The queue is at capacity; the caller should shed load.
#[derive(Debug)]
pub struct QueueFull;

/// Submission handle for the bounded work queue.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::Sender<WorkItem>,
}

impl WorkQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<WorkItem>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Non-blocking submit. A closed queue (shutdown in progress) also
    /// reports full; new work is shed either way.
    pub fn try_submit(&self, item: WorkItem) -> Result<(), QueueFull> {
        self.tx.try_send(item).map_err(|_| QueueFull)
    }
}

/// Fixed-size pool of workers draining the queue until shutdown.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        concurrency: usize,
        rx: mpsc::Receiver<WorkItem>,
        processor: Arc<BotProcessor>,
        shutdown: CancellationToken,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let mut handles = Vec::with_capacity(concurrency);

        for worker_id in 0..concurrency {
            let rx = rx.clone();
            let processor = processor.clone();
            let shutdown = shutdown.clone();
            handles.push(tokio::spawn(async move {
                debug!(worker_id, "worker started");
                loop {
                    let item = tokio::select! {
                        _ = shutdown.cancelled() => break,
                        item = async { rx.lock().await.recv().await } => match item {
                            Some(item) => item,
                            None => break,
                        },
                    };
                    let summary = processor.process(&item.bot, &item.event).await;
                    info!(
                        worker_id,
                        event_id = item.event.id.as_str(),
                        success = summary.success,
                        attempts = summary.attempts,
                        elapsed_ms = summary.processing_time_ms,
                        "event processed"
                    );
                }
                debug!(worker_id, "worker stopped");
            }));
        }

        Self { handles }
    }

    /// Waits for every worker to drain and exit.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbridge_core::EventStatus;

    fn item(id: &str) -> WorkItem {
        WorkItem {
            bot: Bot {
                id: "b1".into(),
                name: "metrics".into(),
                platform: "webhook".into(),
                token: "t".into(),
                enabled_actions: vec![],
                enabled_datasources: vec![],
                default_datasource_id: None,
                ai_provider_id: None,
                enable_query: true,
                is_active: true,
                max_retries: 0,
                request_timeout_ms: 30_000,
            },
            event: BotEvent {
                id: id.into(),
                bot_id: "b1".into(),
                external_event_id: format!("ext-{id}"),
                content: "what is the total?".into(),
                external_user_id: "u1".into(),
                external_user_name: None,
                internal_user_id: None,
                status: EventStatus::Pending,
                retry_count: 0,
                max_retries: 0,
                error_message: None,
                processing_time_ms: None,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            },
        }
    }

    #[test]
    fn full_queue_sheds_load() {
        let (queue, _rx) = WorkQueue::new(1);
        assert!(queue.try_submit(item("e1")).is_ok());
        assert!(queue.try_submit(item("e2")).is_err());
    }

    #[tokio::test]
    async fn closed_queue_reports_full() {
        let (queue, rx) = WorkQueue::new(1);
        drop(rx);
        assert!(queue.try_submit(item("e1")).is_err());
    }
}
