use crate::models::Listing;
use crate::repository::ListingRepository;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info};

/// What the site currently believes the catalogue looks like
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub listings: Vec<Listing>,
    pub featured: Vec<Listing>,
    pub loading: bool,
    pub error: Option<String>,
}

struct State {
    snapshot: CacheSnapshot,
    /// Sequence number of the fetch that produced `snapshot`
    applied: u64,
}

struct Inner {
    repo: Arc<dyn ListingRepository>,
    state: RwLock<State>,
    fetches: AtomicU64,
}

/// In-memory copy of the listing collection and its featured subset.
///
/// Refreshes race freely; the most recently started fetch wins, and an
/// older fetch finishing late is discarded.
#[derive(Clone)]
pub struct ListingCache {
    inner: Arc<Inner>,
}

impl ListingCache {
    pub fn new(repo: Arc<dyn ListingRepository>) -> Self {
        Self {
            inner: Arc::new(Inner {
                repo,
                state: RwLock::new(State {
                    snapshot: CacheSnapshot::default(),
                    applied: 0,
                }),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn repository(&self) -> &Arc<dyn ListingRepository> {
        &self.inner.repo
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.read().snapshot.clone()
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.read().snapshot.listings.clone()
    }

    pub fn featured(&self) -> Vec<Listing> {
        self.read().snapshot.featured.clone()
    }

    pub fn find(&self, id: &str) -> Option<Listing> {
        self.read()
            .snapshot
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    /// Re-fetch everything and the featured subset in parallel, then swap
    /// both at once. On failure both are cleared and the error is recorded.
    pub async fn refresh(&self) -> Result<()> {
        let seq = self.inner.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.write().snapshot.loading = true;

        let repo = &self.inner.repo;
        let result = tokio::try_join!(repo.fetch_all(), repo.fetch_featured());

        let mut state = self.write();
        if seq < state.applied {
            debug!("Discarding stale listing fetch #{} (have #{})", seq, state.applied);
            return Ok(());
        }
        state.applied = seq;
        state.snapshot.loading = seq < self.inner.fetches.load(Ordering::SeqCst);

        match result {
            Ok((listings, featured)) => {
                info!(
                    "Loaded {} listings ({} featured) from {}",
                    listings.len(),
                    featured.len(),
                    repo.store_name()
                );
                state.snapshot.listings = listings;
                state.snapshot.featured = featured;
                state.snapshot.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error loading listings: {:#}", e);
                state.snapshot.listings.clear();
                state.snapshot.featured.clear();
                state.snapshot.error = Some("Failed to load properties".to_string());
                Err(e)
            }
        }
    }

    /// Apply an optimistic edit to both collections without fetching
    pub fn apply_local<F>(&self, edit: F)
    where
        F: Fn(&mut Vec<Listing>),
    {
        let mut state = self.write();
        edit(&mut state.snapshot.listings);
        edit(&mut state.snapshot.featured);
    }
}
