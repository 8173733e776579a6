use crate::models::{ContactSubmission, Listing, ListingDraft, ListingPatch, ListingStatus};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing stores.
/// The document store is the only source of truth; everything else caches it.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Fetch every listing in the `properties` collection
    async fn fetch_all(&self) -> Result<Vec<Listing>>;

    /// Fetch one listing; `None` when the ID is unknown
    async fn fetch_by_id(&self, id: &str) -> Result<Option<Listing>>;

    /// Fetch listings flagged as featured
    async fn fetch_featured(&self) -> Result<Vec<Listing>>;

    /// Create a listing and return the store-assigned ID
    async fn create(&self, draft: &ListingDraft) -> Result<String>;

    /// Apply a partial update and stamp `updatedAt`
    async fn update(&self, id: &str, patch: &ListingPatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn update_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        self.update(id, &ListingPatch::status(status)).await
    }

    /// Name of the backing store, for logs
    fn store_name(&self) -> &'static str;
}

/// Write-once sink for the `contacts` collection
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Persist a submission and return its document ID
    async fn save_contact(&self, submission: &ContactSubmission) -> Result<String>;
}

/// Seed the store with `samples` only when it holds no listings yet.
/// Returns whether anything was written.
pub async fn seed_if_empty(repo: &dyn ListingRepository, samples: &[ListingDraft]) -> Result<bool> {
    let existing = repo.fetch_all().await?;
    if !existing.is_empty() {
        tracing::info!(
            "{} already has {} listings, skipping seed",
            repo.store_name(),
            existing.len()
        );
        return Ok(false);
    }

    tracing::info!("Seeding {} with {} listings", repo.store_name(), samples.len());
    for draft in samples {
        repo.create(draft).await?;
    }
    Ok(true)
}
