//! Error types for inventory_tracker

use thiserror::Error;

/// Unified error type for store and synchronizer operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request to the document store failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Document store answered with an unexpected HTTP status
    #[error("store returned HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse a document store response
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Local database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Item name rejected before any store call was made
    #[error("invalid item name: {0}")]
    InvalidInput(String),
    /// Conditional writes kept losing against concurrent writers
    #[error("update conflict for item '{0}'")]
    Conflict(String),
}

/// Result alias for inventory_tracker operations
pub type Result<T> = std::result::Result<T, InventoryError>;
