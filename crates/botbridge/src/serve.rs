// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the full pipeline and serves until interrupted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use botbridge_config::BridgeConfig;
use botbridge_conversation::ConversationTracker;
use botbridge_core::{
    Action, AdapterRegistry, Bot, BridgeError, DatasourceConfig, DatasourceFactory, EventStore,
};
use botbridge_gateway::{AppState, ServerConfig, WebhookJsonAdapter, start_server};
use botbridge_pipeline::{
    BotActionRunner, BotProcessor, BotQueryProcessor, ContextSettings, DirectSqlQueryService,
    QueryService, RetryEngine, RetryPolicy, WorkQueue, WorkerPool,
};
use botbridge_query::{ActionExecutor, QueryExecutor};
use botbridge_storage::{Database, DatasourceSpec, SqliteDatasourceFactory, SqliteStore};

/// Builds every pipeline component from config, starts the worker pool and
/// the webhook server, and runs until SIGINT.
pub async fn run(config: BridgeConfig) -> Result<(), BridgeError> {
    let db = Database::open(&config.storage.database_path).await?;
    let store = Arc::new(SqliteStore::new(db));

    let factory: Arc<dyn DatasourceFactory> =
        Arc::new(SqliteDatasourceFactory::new(config.datasources.iter().map(
            |entry| DatasourceSpec {
                config: DatasourceConfig {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    engine: entry.engine.clone(),
                },
                path: PathBuf::from(&entry.path),
            },
        )));

    let mut registry = AdapterRegistry::new();
    for platform in &config.platforms {
        registry.register(Arc::new(WebhookJsonAdapter::new(
            &platform.tag,
            platform.signing_secret.clone(),
            platform.reply_url.clone(),
        )));
    }
    let adapters = Arc::new(registry);

    let tracker = Arc::new(ConversationTracker::new(store.clone()));
    let query_service: Arc<dyn QueryService> = Arc::new(DirectSqlQueryService::new(Arc::new(
        QueryExecutor::new(factory.clone()),
    )));
    let queries = BotQueryProcessor::new(
        tracker,
        query_service,
        ContextSettings {
            max_messages: config.query.context_max_messages,
            token_budget: config.query.context_token_budget,
        },
        config.query.row_limit,
    );
    let actions = BotActionRunner::new(ActionExecutor::new(factory));

    let catalog: HashMap<String, Action> = config
        .actions
        .iter()
        .cloned()
        .map(Action::from)
        .map(|action| (action.id.clone(), action))
        .collect();

    let retry = RetryEngine::new(RetryPolicy {
        max_retries: config.retry.max_retries,
        initial_delay_ms: config.retry.initial_delay_ms,
        max_delay_ms: config.retry.max_delay_ms,
        backoff_multiplier: config.retry.backoff_multiplier,
    });

    let events: Arc<dyn EventStore> = store.clone();
    let processor = Arc::new(BotProcessor::new(
        queries,
        actions,
        catalog,
        events.clone(),
        adapters.clone(),
        retry,
    ));

    let (queue, rx) = WorkQueue::new(config.worker.queue_capacity);
    let shutdown = CancellationToken::new();
    let pool = WorkerPool::spawn(config.worker.concurrency, rx, processor, shutdown.clone());

    let bots: HashMap<String, Bot> = config
        .bots
        .iter()
        .cloned()
        .map(Bot::from)
        .map(|bot| (bot.id.clone(), bot))
        .collect();
    info!(
        bots = bots.len(),
        workers = config.worker.concurrency,
        "botbridge starting"
    );

    let state = AppState {
        bots: Arc::new(bots),
        adapters,
        events,
        queue,
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server_shutdown = shutdown.clone();
    let mut server =
        tokio::spawn(async move { start_server(&server_config, state, server_shutdown).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            shutdown.cancel();
            let _ = (&mut server).await;
        }
        result = &mut server => {
            shutdown.cancel();
            match result {
                Ok(Err(err)) => error!(error = %err, "webhook server exited"),
                Err(err) => error!(error = %err, "webhook server task panicked"),
                Ok(Ok(())) => {}
            }
        }
    }

    pool.join().await;
    info!("botbridge stopped");
    Ok(())
}
