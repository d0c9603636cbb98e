//! `todo-server` — the todo API binary.
//!
//! Usage:
//!   todo-server [--listen <addr>] [--db <path>]
//!
//! Without `--db` the server runs on an in-memory database that vanishes
//! on exit, which is what local development wants.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use todo_server::{AppState, TodoStore};

/// Todo API server.
#[derive(Parser, Debug)]
#[command(name = "todo-server", about = "Todo API server")]
struct Cli {
    /// Listen address.
    #[arg(long = "listen", default_value = "127.0.0.1:8787")]
    listen: String,

    /// Path to the SQLite database file. Omit for in-memory.
    #[arg(long = "db")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let store = match &cli.db {
        Some(path) => {
            info!("Opening database at {}", path.display());
            TodoStore::open(path)?
        }
        None => {
            info!("Using in-memory database");
            TodoStore::open_in_memory()?
        }
    };

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Todo server listening on {}", cli.listen);
    todo_server::run(listener, AppState::new(Arc::new(store))).await?;

    Ok(())
}
