//! Storage backends for the inventory collection
//!
//! The store client is written against the `InventoryBackend` trait so the
//! collection can live in a remote document store (REST) or in a local SQLite
//! file without the rest of the crate caring which.

mod rest;
mod sqlite;

pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

use crate::error::Result;
use crate::models::InventoryItem;
use async_trait::async_trait;

/// A keyed document collection holding one quantity per item name.
///
/// Besides the plain get/set/delete/list contract, every backend must offer
/// conditional writes (`create_if_absent`, `set_if_equals`,
/// `delete_if_equals`) so the store client can mutate without losing updates
/// to concurrent writers. A conditional write returns `Ok(false)` when the
/// precondition no longer held, never an error.
///
/// Quantities below 1 violate the collection invariant (an item at 0 is
/// deleted, not stored); backends are free to reject such writes.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// Fetch the quantity stored under `name`, or `None` if absent.
    async fn get(&self, name: &str) -> Result<Option<u32>>;

    /// Full overwrite of the document under `name`, creating it if absent.
    async fn set(&self, name: &str, quantity: u32) -> Result<()>;

    /// Remove the document under `name`. Deleting an absent document is not
    /// an error.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Every document in the collection, in the backend's natural order.
    async fn list(&self) -> Result<Vec<InventoryItem>>;

    /// Create the document only if no document exists under `name`.
    /// Returns `false` when one already exists.
    async fn create_if_absent(&self, name: &str, quantity: u32) -> Result<bool>;

    /// Overwrite only if the current quantity equals `expected`.
    /// Returns `false` when the document is absent or holds another value.
    async fn set_if_equals(&self, name: &str, expected: u32, quantity: u32) -> Result<bool>;

    /// Delete only if the current quantity equals `expected`.
    /// Returns `false` when the document is absent or holds another value.
    async fn delete_if_equals(&self, name: &str, expected: u32) -> Result<bool>;
}
