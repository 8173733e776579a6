use crate::models::Listing;
use crate::state::snapshot::{Insert, Lifecycle, SnapshotList};
use crate::state::storage::LocalStore;
use std::sync::Arc;
use tracing::debug;

const STORAGE_KEY: &str = "realEstateCompare";

/// Listings compared side by side at most
pub const MAX_COMPARE_ITEMS: usize = 3;

/// Capacity-bounded comparison set. A full set evicts its oldest entry
/// to make room; adds are never rejected.
pub struct Comparison {
    list: SnapshotList,
}

impl Comparison {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            list: SnapshotList::new(STORAGE_KEY, Some(MAX_COMPARE_ITEMS), store),
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

    /// Returns the evicted listing, if the set was full
    pub fn add(&self, listing: Listing) -> Option<Listing> {
        match self.list.insert(listing) {
            Insert::Added { evicted } => {
                if let Some(old) = &evicted {
                    debug!("Comparison full, evicted {}", old.id);
                }
                evicted
            }
            Insert::Duplicate => None,
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.list.remove(id)
    }

    pub fn clear(&self) {
        self.list.clear()
    }

    pub fn is_in_compare(&self, id: &str) -> bool {
        self.list.contains(id)
    }

    pub fn list(&self) -> Vec<Listing> {
        self.list.items()
    }

    pub fn count(&self) -> usize {
        self.list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::listing;
    use crate::state::storage::MemoryStore;

    #[tokio::test]
    async fn fourth_add_evicts_the_oldest() {
        let compare = Comparison::new(Arc::new(MemoryStore::new()));
        compare.init().await;
        for id in ["1", "2", "3"] {
            assert!(compare.add(listing(id, 1.0, 1)).is_none());
        }
        let evicted = compare.add(listing("4", 1.0, 1)).unwrap();
        assert_eq!(evicted.id, "1");

        let ids: Vec<_> = compare.list().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[tokio::test]
    async fn duplicate_add_does_not_evict() {
        let compare = Comparison::new(Arc::new(MemoryStore::new()));
        compare.init().await;
        for id in ["1", "2", "3"] {
            compare.add(listing(id, 1.0, 1));
        }
        assert!(compare.add(listing("2", 1.0, 1)).is_none());
        assert_eq!(compare.count(), MAX_COMPARE_ITEMS);
        assert!(compare.is_in_compare("1"));
    }

    #[tokio::test]
    async fn clear_empties_the_set() {
        let compare = Comparison::new(Arc::new(MemoryStore::new()));
        compare.init().await;
        compare.add(listing("1", 1.0, 1));
        compare.clear();
        assert_eq!(compare.count(), 0);
    }
}
