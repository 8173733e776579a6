use crate::models::Listing;
use crate::state::storage::LocalStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Hydrating,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Insert {
    Duplicate,
    Added { evicted: Option<Listing> },
}

struct Inner {
    items: Vec<Listing>,
    lifecycle: Lifecycle,
}

struct Writer {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Ordered, ID-deduplicated list of listing snapshots mirrored to a
/// [`LocalStore`] key. Mutations are applied in memory immediately; the
/// serialized list is handed to a single writer task, so saves land in
/// mutation order and the last one wins.
pub struct SnapshotList {
    key: &'static str,
    capacity: Option<usize>,
    store: Arc<dyn LocalStore>,
    inner: Mutex<Inner>,
    writer: Mutex<Option<Writer>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SnapshotList {
    pub fn new(key: &'static str, capacity: Option<usize>, store: Arc<dyn LocalStore>) -> Self {
        Self {
            key,
            capacity,
            store,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                lifecycle: Lifecycle::Uninitialized,
            }),
            writer: Mutex::new(None),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        lock(&self.inner).lifecycle
    }

    /// Hydrate from the store and start mirroring. Calling it again is a no-op.
    pub async fn init(&self) {
        {
            let mut inner = lock(&self.inner);
            if inner.lifecycle != Lifecycle::Uninitialized {
                return;
            }
            inner.lifecycle = Lifecycle::Hydrating;
        }

        let saved = match self.store.load(self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Listing>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    error!("Error parsing saved {}: {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read saved {}: {:#}", self.key, e);
                Vec::new()
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let store = self.store.clone();
        let key = self.key;
        let task = tokio::spawn(async move {
            while let Some(serialized) = rx.recv().await {
                if let Err(e) = store.save(key, &serialized).await {
                    error!("Failed to persist {}: {:#}", key, e);
                }
            }
        });
        *lock(&self.writer) = Some(Writer { tx, task });

        let mut inner = lock(&self.inner);
        // Anything added while hydrating goes after the saved entries
        let pending = std::mem::take(&mut inner.items);
        inner.items = dedupe(saved);
        for listing in pending {
            push(&mut inner.items, listing, self.capacity);
        }
        if let Some(cap) = self.capacity {
            let excess = inner.items.len().saturating_sub(cap);
            inner.items.drain(..excess);
        }
        inner.lifecycle = Lifecycle::Ready;
        debug!("{} hydrated with {} entries", self.key, inner.items.len());
        self.mirror(&inner.items);
    }

    /// Stop mirroring after flushing every queued save
    pub async fn dispose(&self) {
        let writer = lock(&self.writer).take();
        if let Some(Writer { tx, task }) = writer {
            drop(tx);
            if let Err(e) = task.await {
                error!("{} writer stopped abnormally: {}", self.key, e);
            }
        }
        lock(&self.inner).lifecycle = Lifecycle::Uninitialized;
    }

    fn mirror(&self, items: &[Listing]) {
        let writer = lock(&self.writer);
        let Some(writer) = writer.as_ref() else {
            return;
        };
        match serde_json::to_string(items) {
            Ok(serialized) => {
                if writer.tx.send(serialized).is_err() {
                    warn!("{} writer is gone, change not persisted", self.key);
                }
            }
            Err(e) => error!("Failed to serialize {}: {}", self.key, e),
        }
    }

    pub fn insert(&self, listing: Listing) -> Insert {
        let mut inner = lock(&self.inner);
        let outcome = push(&mut inner.items, listing, self.capacity);
        if outcome != Insert::Duplicate {
            self.mirror(&inner.items);
        }
        outcome
    }

    /// Returns whether anything was removed
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.items.len();
        inner.items.retain(|l| l.id != id);
        let removed = inner.items.len() != before;
        if removed {
            self.mirror(&inner.items);
        }
        removed
    }

    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.items.clear();
        self.mirror(&inner.items);
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner).items.iter().any(|l| l.id == id)
    }

    pub fn items(&self) -> Vec<Listing> {
        lock(&self.inner).items.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push(items: &mut Vec<Listing>, listing: Listing, capacity: Option<usize>) -> Insert {
    if items.iter().any(|l| l.id == listing.id) {
        return Insert::Duplicate;
    }
    let evicted = match capacity {
        Some(cap) if cap > 0 && items.len() >= cap => Some(items.remove(0)),
        _ => None,
    };
    items.push(listing);
    Insert::Added { evicted }
}

fn dedupe(items: Vec<Listing>) -> Vec<Listing> {
    let mut out: Vec<Listing> = Vec::with_capacity(items.len());
    for listing in items {
        if !out.iter().any(|l| l.id == listing.id) {
            out.push(listing);
        }
    }
    out
}
