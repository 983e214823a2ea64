//! Core data model for the inventory tracker

use serde::{Deserialize, Serialize};

/// A tracked inventory item: the document key plus its single stored field.
///
/// `name` doubles as the primary key in the collection. Case is preserved
/// (two names differing only in case are distinct items); search matching is
/// the only case-insensitive operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    /// Count on hand. Always >= 1 while the item exists; an item whose
    /// quantity would reach 0 is deleted instead.
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Case-insensitive substring match used by the search filter.
    /// An empty term matches every item.
    pub fn matches_search(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }
}
