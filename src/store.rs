//! Store client: lists and mutates named quantities in a document store.
//!
//! Mutations never blind-write. Each increment or decrement reads the
//! current quantity and then applies a conditional write that only lands
//! if the quantity is still what was read. When a concurrent writer got
//! there first the conditional write reports a miss and the whole
//! read-modify-write round is retried.

use std::sync::Arc;

use crate::backend::InventoryBackend;
use crate::error::{InventoryError, Result};
use crate::models::InventoryItem;

/// How many read-modify-write rounds a mutation gets before giving up.
const MAX_MUTATION_ATTEMPTS: u32 = 5;

/// Client-side handle on one document collection of item quantities.
#[derive(Clone)]
pub struct InventoryStore {
    backend: Arc<dyn InventoryBackend>,
}

impl InventoryStore {
    pub fn new(backend: Arc<dyn InventoryBackend>) -> Self {
        Self { backend }
    }

    /// Fetches every item in the collection, sorted by name.
    pub async fn list_all(&self) -> Result<Vec<InventoryItem>> {
        let mut items = self.backend.list().await?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Raises the quantity of `name` by one, creating the item at quantity 1
    /// when it does not exist yet.
    pub async fn increment(&self, name: &str) -> Result<()> {
        for attempt in 1..=MAX_MUTATION_ATTEMPTS {
            let applied = match self.backend.get(name).await? {
                None => self.backend.create_if_absent(name, 1).await?,
                Some(quantity) => {
                    let next = quantity.saturating_add(1);
                    self.backend.set_if_equals(name, quantity, next).await?
                }
            };
            if applied {
                log::debug!("Incremented '{}'", name);
                return Ok(());
            }
            log::warn!(
                "Lost an update race on '{}', retrying increment (attempt {}/{})",
                name,
                attempt,
                MAX_MUTATION_ATTEMPTS
            );
        }
        Err(InventoryError::Conflict(name.to_string()))
    }

    /// Lowers the quantity of `name` by one and removes the item entirely
    /// when it would reach zero. Absent items are left alone.
    pub async fn decrement(&self, name: &str) -> Result<()> {
        for attempt in 1..=MAX_MUTATION_ATTEMPTS {
            let applied = match self.backend.get(name).await? {
                None => return Ok(()),
                Some(1) => self.backend.delete_if_equals(name, 1).await?,
                Some(quantity) => {
                    self.backend
                        .set_if_equals(name, quantity, quantity - 1)
                        .await?
                }
            };
            if applied {
                log::debug!("Decremented '{}'", name);
                return Ok(());
            }
            log::warn!(
                "Lost an update race on '{}', retrying decrement (attempt {}/{})",
                name,
                attempt,
                MAX_MUTATION_ATTEMPTS
            );
        }
        Err(InventoryError::Conflict(name.to_string()))
    }
}
