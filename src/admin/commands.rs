use crate::models::{Listing, ListingStatus};
use crate::repository::ListingRepository;
use crate::state::ListingCache;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Dashboard mutations. Each one is applied to the cache immediately, then
/// sent to the store, then reconciled by a background refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Delete { id: String },
    MarkSold { id: String },
}

impl AdminCommand {
    pub fn id(&self) -> &str {
        match self {
            AdminCommand::Delete { id } | AdminCommand::MarkSold { id } => id,
        }
    }

    fn apply_local(&self, cache: &ListingCache) {
        match self {
            AdminCommand::Delete { id } => {
                cache.apply_local(|items: &mut Vec<Listing>| items.retain(|l| &l.id != id))
            }
            AdminCommand::MarkSold { id } => {
                let now = Utc::now();
                cache.apply_local(|items: &mut Vec<Listing>| {
                    for listing in items.iter_mut().filter(|l| &l.id == id) {
                        listing.status = ListingStatus::Sold;
                        listing.updated_at = Some(now);
                    }
                })
            }
        }
    }

    async fn execute(&self, repo: &dyn ListingRepository) -> Result<()> {
        match self {
            AdminCommand::Delete { id } => repo.delete(id).await,
            AdminCommand::MarkSold { id } => repo.update_status(id, ListingStatus::Sold).await,
        }
    }
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total: usize,
    pub for_sale: usize,
    pub sold: usize,
    pub featured: usize,
}

impl DashboardSummary {
    pub fn from_listings(listings: &[Listing]) -> Self {
        Self {
            total: listings.len(),
            for_sale: listings
                .iter()
                .filter(|l| l.status == ListingStatus::ForSale)
                .count(),
            sold: listings
                .iter()
                .filter(|l| l.status == ListingStatus::Sold)
                .count(),
            featured: listings.iter().filter(|l| l.featured).count(),
        }
    }
}

pub struct Dashboard {
    cache: ListingCache,
}

impl Dashboard {
    pub fn new(cache: ListingCache) -> Self {
        Self { cache }
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_listings(&self.cache.listings())
    }

    /// Run a command optimistically. On success the returned handle is the
    /// pending reconciliation; whatever that fetch sees replaces the local
    /// edit. On failure the cache is re-fetched before the error is returned.
    pub async fn run(&self, command: AdminCommand) -> Result<JoinHandle<()>> {
        command.apply_local(&self.cache);

        if let Err(e) = command.execute(self.cache.repository().as_ref()).await {
            warn!("{:?} failed, reverting local state: {:#}", command, e);
            let _ = self.cache.refresh().await;
            return Err(e);
        }

        info!("Applied {:?}", command);
        let cache = self.cache.clone();
        Ok(tokio::spawn(async move {
            // Errors are recorded on the cache snapshot
            let _ = cache.refresh().await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::listing;
    use crate::repository::MemoryRepository;
    use std::sync::Arc;

    async fn dashboard(listings: Vec<Listing>) -> (Dashboard, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::with_listings(listings));
        let cache = ListingCache::new(repo.clone());
        cache.refresh().await.unwrap();
        (Dashboard::new(cache), repo)
    }

    #[tokio::test]
    async fn mark_sold_shows_up_before_reconciliation() {
        let (dashboard, repo) = dashboard(vec![listing("a", 1.0, 1)]).await;

        let pending = dashboard
            .run(AdminCommand::MarkSold { id: "a".to_string() })
            .await
            .unwrap();
        assert_eq!(dashboard.cache.find("a").unwrap().status, ListingStatus::Sold);

        pending.await.unwrap();
        assert_eq!(dashboard.cache.find("a").unwrap().status, ListingStatus::Sold);
        let stored = repo.fetch_by_id("a").await.unwrap().unwrap();
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn delete_removes_locally_and_in_store() {
        let (dashboard, repo) =
            dashboard(vec![listing("a", 1.0, 1), listing("b", 1.0, 1)]).await;

        let pending = dashboard
            .run(AdminCommand::Delete { id: "a".to_string() })
            .await
            .unwrap();
        assert!(dashboard.cache.find("a").is_none());
        pending.await.unwrap();

        assert!(dashboard.cache.find("a").is_none());
        assert_eq!(repo.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_is_reverted_by_the_store() {
        let (dashboard, repo) = dashboard(vec![listing("a", 1.0, 1)]).await;
        repo.set_fail_writes(true);

        let result = dashboard.run(AdminCommand::Delete { id: "a".to_string() }).await;
        assert!(result.is_err());
        assert!(dashboard.cache.find("a").is_some());
    }

    #[tokio::test]
    async fn summary_counts_by_status() {
        let mut sold = listing("s", 1.0, 1);
        sold.status = ListingStatus::Sold;
        let mut featured = listing("f", 1.0, 1);
        featured.featured = true;
        let (dashboard, _) = dashboard(vec![sold, featured, listing("n", 1.0, 1)]).await;

        assert_eq!(
            dashboard.summary(),
            DashboardSummary {
                total: 3,
                for_sale: 2,
                sold: 1,
                featured: 1,
            }
        );
    }
}
