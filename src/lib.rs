//! Inventory tracker core.
//!
//! Keeps named item quantities in a document store and mirrors them into an
//! in-memory view a presentation layer can render: the full list plus a
//! search-filtered projection. Mutations go store-first through conditional
//! writes, and the view is re-read from the store after every change.

pub mod backend;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
pub mod web;

pub use backend::{InventoryBackend, RestBackend, SqliteBackend};
pub use error::{InventoryError, Result};
pub use models::InventoryItem;
pub use store::InventoryStore;
pub use sync::{filter_items, Synchronizer, ViewSnapshot};
