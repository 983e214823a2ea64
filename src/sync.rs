//! View-state synchronizer.
//!
//! Holds the authoritative in-memory copy of the inventory together with
//! the projection the presentation layer renders: the same list narrowed
//! by the current search term. Every mutation goes through the store
//! first, and the local view is only replaced after a full re-list
//! succeeded, so observers never see a half-applied update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::error::{InventoryError, Result};
use crate::models::InventoryItem;
use crate::store::InventoryStore;

/// Everything the presentation layer needs to render one consistent frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewSnapshot {
    /// Authoritative list of all items, sorted by name.
    pub inventory: Vec<InventoryItem>,
    /// `inventory` narrowed down by `search_term`.
    pub filtered_inventory: Vec<InventoryItem>,
    /// Current search term, verbatim as entered.
    pub search_term: String,
    /// When the inventory was last confirmed against the store.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Narrows `items` down to those whose name contains `term`,
/// case-insensitively. An empty term keeps everything.
pub fn filter_items(items: &[InventoryItem], term: &str) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| item.matches_search(term))
        .cloned()
        .collect()
}

/// Keeps the in-memory view in step with the store and publishes every
/// state change to subscribers.
pub struct Synchronizer {
    store: InventoryStore,
    state: Mutex<ViewSnapshot>,
    publisher: watch::Sender<ViewSnapshot>,
}

impl Synchronizer {
    pub fn new(store: InventoryStore) -> Self {
        let (publisher, _) = watch::channel(ViewSnapshot::default());
        Self {
            store,
            state: Mutex::new(ViewSnapshot::default()),
            publisher,
        }
    }

    /// Re-reads the whole inventory from the store. The previous view
    /// stays in place when the store cannot be reached.
    pub async fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Adds one unit of `name`, creating the item when needed, then brings
    /// the view up to date.
    pub async fn add(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::InvalidInput(
                "item name must not be empty".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        self.store.increment(name).await?;
        self.refresh_locked(&mut state).await
    }

    /// Removes one unit of `name`, deleting the item when it reaches zero,
    /// then brings the view up to date. Blank and unknown names are left
    /// alone.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let mut state = self.state.lock().await;
        self.store.decrement(name).await?;
        self.refresh_locked(&mut state).await
    }

    /// Replaces the search term and recomputes the filtered projection
    /// from the in-memory inventory. No store round-trip.
    pub async fn set_search_term(&self, term: &str) {
        let mut state = self.state.lock().await;
        state.search_term = term.to_string();
        state.filtered_inventory = filter_items(&state.inventory, term);
        self.publisher.send_replace(state.clone());
    }

    /// Current view, cloned out.
    pub async fn snapshot(&self) -> ViewSnapshot {
        self.state.lock().await.clone()
    }

    /// Subscribes to view changes. The receiver always holds the latest
    /// published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.publisher.subscribe()
    }

    /// The state lock is held by the caller across the store mutation and
    /// this re-list, so concurrent mutate-refresh chains cannot interleave.
    async fn refresh_locked(&self, state: &mut ViewSnapshot) -> Result<()> {
        let items = self.store.list_all().await?;
        log::debug!("Refreshed inventory: {} items", items.len());
        state.filtered_inventory = filter_items(&items, &state.search_term);
        state.inventory = items;
        state.refreshed_at = Some(Utc::now());
        self.publisher.send_replace(state.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
