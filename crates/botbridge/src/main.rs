// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Botbridge - bridge chat-platform webhooks to SQL analytics bots.
//!
//! This is the binary entry point for the botbridge server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;

/// Botbridge - bridge chat-platform webhooks to SQL analytics bots.
#[derive(Parser, Debug)]
#[command(name = "botbridge", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server and worker pool.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match botbridge_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            botbridge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(error) = serve::run(config).await {
                eprintln!("botbridge: {error}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!(
                "server: {}:{}\nstorage: {}\nworkers: {} (queue {})\nbots: {}\nplatforms: {}\ndatasources: {}\nactions: {}",
                config.server.host,
                config.server.port,
                config.storage.database_path,
                config.worker.concurrency,
                config.worker.queue_capacity,
                config.bots.len(),
                config.platforms.len(),
                config.datasources.len(),
                config.actions.len(),
            );
        }
        None => {
            println!("botbridge: use --help for available commands");
        }
    }
}
