use super::*;
use crate::backend::{InventoryBackend, SqliteBackend};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn test_sync() -> Synchronizer {
    let backend = SqliteBackend::open_in_memory().unwrap();
    Synchronizer::new(InventoryStore::new(Arc::new(backend)))
}

async fn seeded_sync(items: &[(&str, u32)]) -> (Arc<SqliteBackend>, Synchronizer) {
    let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
    for (name, quantity) in items {
        backend.set(name, *quantity).await.unwrap();
    }
    let sync = Synchronizer::new(InventoryStore::new(backend.clone()));
    (backend, sync)
}

fn names(items: &[InventoryItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

/// Backend that can be switched to refuse listings, as if the store went
/// away mid-session.
struct FlakyListBackend {
    inner: SqliteBackend,
    fail_listing: AtomicBool,
}

impl FlakyListBackend {
    fn new() -> Self {
        Self {
            inner: SqliteBackend::open_in_memory().unwrap(),
            fail_listing: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl InventoryBackend for FlakyListBackend {
    async fn get(&self, name: &str) -> Result<Option<u32>> {
        self.inner.get(name).await
    }

    async fn set(&self, name: &str, quantity: u32) -> Result<()> {
        self.inner.set(name, quantity).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.inner.delete(name).await
    }

    async fn list(&self) -> Result<Vec<InventoryItem>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(InventoryError::HttpStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        self.inner.list().await
    }

    async fn create_if_absent(&self, name: &str, quantity: u32) -> Result<bool> {
        self.inner.create_if_absent(name, quantity).await
    }

    async fn set_if_equals(&self, name: &str, expected: u32, quantity: u32) -> Result<bool> {
        self.inner.set_if_equals(name, expected, quantity).await
    }

    async fn delete_if_equals(&self, name: &str, expected: u32) -> Result<bool> {
        self.inner.delete_if_equals(name, expected).await
    }
}

// ── filter_items ─────────────────────────────────────────────────────────

#[test]
fn filter_matches_case_insensitive_substring() {
    let items = vec![
        InventoryItem::new("Banana", 1),
        InventoryItem::new("Mango", 2),
        InventoryItem::new("apple", 3),
    ];

    let filtered = filter_items(&items, "AN");
    assert_eq!(names(&filtered), vec!["Banana", "Mango"]);
}

#[test]
fn filter_empty_term_keeps_everything() {
    let items = vec![
        InventoryItem::new("apple", 3),
        InventoryItem::new("banana", 1),
    ];

    assert_eq!(filter_items(&items, ""), items);
}

#[test]
fn filter_without_matches_is_empty() {
    let items = vec![InventoryItem::new("apple", 3)];

    assert!(filter_items(&items, "zzz").is_empty());
}

// ── refresh ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_loads_store_contents() {
    let (_backend, sync) = seeded_sync(&[("banana", 2), ("apple", 5)]).await;

    sync.refresh().await.unwrap();

    let snapshot = sync.snapshot().await;
    assert_eq!(
        snapshot.inventory,
        vec![
            InventoryItem::new("apple", 5),
            InventoryItem::new("banana", 2),
        ]
    );
    assert_eq!(snapshot.filtered_inventory, snapshot.inventory);
}

#[tokio::test]
async fn refresh_stamps_the_snapshot() {
    let sync = test_sync();
    assert!(sync.snapshot().await.refreshed_at.is_none());

    sync.refresh().await.unwrap();

    assert!(sync.snapshot().await.refreshed_at.is_some());
}

#[tokio::test]
async fn refresh_is_idempotent() {
    let (_backend, sync) = seeded_sync(&[("apple", 3), ("banana", 1)]).await;

    sync.refresh().await.unwrap();
    let first = sync.snapshot().await;
    sync.refresh().await.unwrap();
    let second = sync.snapshot().await;

    assert_eq!(first.inventory, second.inventory);
    assert_eq!(first.filtered_inventory, second.filtered_inventory);
}

#[tokio::test]
async fn refresh_reapplies_active_search() {
    let (backend, sync) = seeded_sync(&[("apple", 1), ("banana", 1)]).await;
    sync.refresh().await.unwrap();
    sync.set_search_term("ban").await;

    // A new matching item lands in the store behind our back.
    backend.set("bandana", 2).await.unwrap();
    sync.refresh().await.unwrap();

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.search_term, "ban");
    assert_eq!(names(&snapshot.inventory), vec!["apple", "banana", "bandana"]);
    assert_eq!(names(&snapshot.filtered_inventory), vec!["banana", "bandana"]);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_view() {
    let backend = Arc::new(FlakyListBackend::new());
    backend.inner.set("banana", 1).await.unwrap();
    let sync = Synchronizer::new(InventoryStore::new(backend.clone()));
    sync.refresh().await.unwrap();

    backend.fail_listing.store(true, Ordering::SeqCst);
    backend.inner.set("apple", 3).await.unwrap();
    assert!(sync.refresh().await.is_err());

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.inventory, vec![InventoryItem::new("banana", 1)]);

    backend.fail_listing.store(false, Ordering::SeqCst);
    sync.refresh().await.unwrap();
    assert_eq!(sync.snapshot().await.inventory.len(), 2);
}

#[tokio::test]
async fn mutation_with_failed_relist_keeps_previous_view() {
    let backend = Arc::new(FlakyListBackend::new());
    let sync = Synchronizer::new(InventoryStore::new(backend.clone()));
    sync.add("banana").await.unwrap();

    backend.fail_listing.store(true, Ordering::SeqCst);
    assert!(sync.add("apple").await.is_err());

    // The write itself landed but the view was not half-updated.
    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.inventory, vec![InventoryItem::new("banana", 1)]);

    backend.fail_listing.store(false, Ordering::SeqCst);
    sync.refresh().await.unwrap();
    assert_eq!(names(&sync.snapshot().await.inventory), vec!["apple", "banana"]);
}

// ── add ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_creates_and_counts_up() {
    let sync = test_sync();

    sync.add("banana").await.unwrap();
    sync.add("banana").await.unwrap();

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.inventory, vec![InventoryItem::new("banana", 2)]);
    assert_eq!(snapshot.filtered_inventory, snapshot.inventory);
}

#[tokio::test]
async fn add_trims_surrounding_whitespace() {
    let sync = test_sync();

    sync.add("  banana  ").await.unwrap();

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.inventory, vec![InventoryItem::new("banana", 1)]);
}

#[tokio::test]
async fn add_rejects_blank_name() {
    let sync = test_sync();

    match sync.add("   ").await {
        Err(InventoryError::InvalidInput(_)) => {}
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
    // Nothing ran, not even a refresh.
    assert!(sync.snapshot().await.refreshed_at.is_none());
}

// ── remove ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_counts_down_and_drops_at_zero() {
    let (_backend, sync) = seeded_sync(&[("banana", 2)]).await;
    sync.refresh().await.unwrap();

    sync.remove("banana").await.unwrap();
    assert_eq!(
        sync.snapshot().await.inventory,
        vec![InventoryItem::new("banana", 1)]
    );

    sync.remove("banana").await.unwrap();
    assert!(sync.snapshot().await.inventory.is_empty());
}

#[tokio::test]
async fn remove_unknown_name_is_no_op() {
    let (_backend, sync) = seeded_sync(&[("apple", 1)]).await;
    sync.refresh().await.unwrap();

    sync.remove("banana").await.unwrap();

    assert_eq!(
        sync.snapshot().await.inventory,
        vec![InventoryItem::new("apple", 1)]
    );
}

#[tokio::test]
async fn remove_blank_name_is_no_op() {
    let sync = test_sync();

    sync.remove("   ").await.unwrap();

    // Short-circuits before the store is touched.
    assert!(sync.snapshot().await.refreshed_at.is_none());
}

// ── search ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_search_term_narrows_filtered_view() {
    let (_backend, sync) = seeded_sync(&[("apple", 1), ("banana", 2), ("mango", 3)]).await;
    sync.refresh().await.unwrap();

    sync.set_search_term("an").await;

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.search_term, "an");
    assert_eq!(names(&snapshot.inventory), vec!["apple", "banana", "mango"]);
    assert_eq!(names(&snapshot.filtered_inventory), vec!["banana", "mango"]);
}

#[tokio::test]
async fn clearing_search_term_restores_full_view() {
    let (_backend, sync) = seeded_sync(&[("apple", 1), ("banana", 2)]).await;
    sync.refresh().await.unwrap();

    sync.set_search_term("ban").await;
    sync.set_search_term("").await;

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.filtered_inventory, snapshot.inventory);
}

#[tokio::test]
async fn search_term_is_kept_verbatim() {
    let (_backend, sync) = seeded_sync(&[("banana", 1)]).await;
    sync.refresh().await.unwrap();

    sync.set_search_term(" ban ").await;

    // No trimming: the padded term matches nothing.
    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.search_term, " ban ");
    assert!(snapshot.filtered_inventory.is_empty());
}

// ── subscriptions ────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_receive_published_snapshots() {
    let sync = test_sync();
    let mut rx = sync.subscribe();

    sync.add("banana").await.unwrap();

    rx.changed().await.unwrap();
    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.inventory, vec![InventoryItem::new("banana", 1)]);
}

#[tokio::test]
async fn late_subscriber_sees_current_state() {
    let sync = test_sync();
    sync.add("banana").await.unwrap();

    let rx = sync.subscribe();
    assert_eq!(
        rx.borrow().inventory,
        vec![InventoryItem::new("banana", 1)]
    );
}
