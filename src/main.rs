//! Inventory Tracker - item quantities synced with a document store
//!
//! Serves the synchronized inventory view over HTTP. Quantities live in a
//! document store: a local SQLite file by default, or a remote document
//! collection when --store-url is given.

use clap::Parser;
use inventory_tracker::{
    InventoryBackend, InventoryStore, RestBackend, SqliteBackend, Synchronizer,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Inventory tracker server - keeps item quantities in sync with a document store
#[derive(Parser, Debug)]
#[command(name = "inventory_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file (used when no store URL is given)
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Base URL of a remote document store (overrides --database)
    #[arg(long)]
    store_url: Option<String>,

    /// Collection name in the remote store
    #[arg(long, default_value = "inventory")]
    collection: String,

    /// Port for the HTTP API
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Returns the default database path: ~/.local/share/inventory_tracker/inventory.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inventory_tracker")
        .join("inventory.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("Starting inventory_tracker...");

    let backend: Arc<dyn InventoryBackend> = if let Some(url) = &args.store_url {
        log::info!("Using remote document store at {}", url);
        Arc::new(RestBackend::new(url.clone(), args.collection.clone()))
    } else {
        let db_path = PathBuf::from(&args.database);
        log::info!("Database path: {}", db_path.display());

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::error!("Failed to create database directory: {}", e);
                    std::process::exit(1);
                }
                log::info!("Created directory: {}", parent.display());
            }
        }

        match SqliteBackend::open(&db_path) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                log::error!("Failed to open database: {}", e);
                std::process::exit(1);
            }
        }
    };

    let sync = Arc::new(Synchronizer::new(InventoryStore::new(backend)));

    // The server starts even when the store is unreachable; requests keep
    // reporting the outage until a refresh gets through.
    match sync.refresh().await {
        Ok(()) => log::info!("Loaded {} items", sync.snapshot().await.inventory.len()),
        Err(e) => log::error!("Failed to load initial inventory: {}", e),
    }

    if let Err(e) = inventory_tracker::web::serve(sync, args.port).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
