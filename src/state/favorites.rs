use crate::models::Listing;
use crate::state::snapshot::{Insert, Lifecycle, SnapshotList};
use crate::state::storage::LocalStore;
use std::sync::Arc;

const STORAGE_KEY: &str = "realEstateFavorites";

/// Unbounded favorites, deduplicated by listing ID
pub struct Favorites {
    list: SnapshotList,
}

impl Favorites {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            list: SnapshotList::new(STORAGE_KEY, None, store),
        }
    }

    pub async fn init(&self) {
        self.list.init().await
    }

    pub async fn dispose(&self) {
        self.list.dispose().await
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.list.lifecycle()
    }

    /// No-op when the listing is already a favorite
    pub fn add(&self, listing: Listing) -> bool {
        matches!(self.list.insert(listing), Insert::Added { .. })
    }

    /// No-op when absent
    pub fn remove(&self, id: &str) -> bool {
        self.list.remove(id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.list.contains(id)
    }

    pub fn list(&self) -> Vec<Listing> {
        self.list.items()
    }

    pub fn count(&self) -> usize {
        self.list.len()
    }
}
