use crate::models::{
    ContactSubmission, Listing, ListingDraft, ListingPatch, ListingStatus, ServiceType,
};
use crate::repository::traits::{ContactRepository, ListingRepository};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-process listing store used in demo mode and tests
#[derive(Default)]
pub struct MemoryRepository {
    listings: RwLock<Vec<Listing>>,
    contacts: RwLock<Vec<(String, ContactSubmission)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with the sample catalogue
    pub fn with_samples() -> Self {
        let now = Utc::now();
        let listings = sample_listings()
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                // Stagger creation so newest/oldest ordering is meaningful
                let created = now - Duration::days((i as i64 + 1) * 3);
                draft.into_listing(format!("sample-{}", i + 1), created)
            })
            .collect();

        info!("📋 Loaded sample catalogue into memory store");
        Self {
            listings: RwLock::new(listings),
            ..Self::default()
        }
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            ..Self::default()
        }
    }

    /// Make every read fail, to exercise error paths
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write (including contact saves) fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn contacts(&self) -> Vec<ContactSubmission> {
        self.contacts
            .read()
            .await
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is unavailable for reads");
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is unavailable for writes");
        }
        Ok(())
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl ListingRepository for MemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<Listing>> {
        self.check_reads()?;
        Ok(self.listings.read().await.clone())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Listing>> {
        self.check_reads()?;
        Ok(self
            .listings
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn fetch_featured(&self) -> Result<Vec<Listing>> {
        self.check_reads()?;
        Ok(self
            .listings
            .read()
            .await
            .iter()
            .filter(|l| l.featured)
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &ListingDraft) -> Result<String> {
        self.check_writes()?;
        let id = new_id();
        let listing = draft.clone().into_listing(id.clone(), Utc::now());
        self.listings.write().await.push(listing);
        debug!("Created listing {} in memory", id);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &ListingPatch) -> Result<()> {
        self.check_writes()?;
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| anyhow::anyhow!("No listing with id {}", id))?;
        patch.apply_to(listing);
        listing.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_writes()?;
        self.listings.write().await.retain(|l| l.id != id);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl ContactRepository for MemoryRepository {
    async fn save_contact(&self, submission: &ContactSubmission) -> Result<String> {
        self.check_writes()?;
        let id = new_id();
        self.contacts
            .write()
            .await
            .push((id.clone(), submission.clone()));
        Ok(id)
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Sample catalogue used for demo mode and `--seed`
pub fn sample_listings() -> Vec<ListingDraft> {
    vec![
        ListingDraft {
            title: "Modern Family Home".to_string(),
            price: 485_000.0,
            location: "Westlake Hills".to_string(),
            address: "1204 Ridge Oak Dr".to_string(),
            property_type: "House".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms: 4,
            bathrooms: 3.0,
            area: 2_650.0,
            description: "Open-plan living with a renovated kitchen and a shaded backyard.".to_string(),
            features: features(&["Garage", "Backyard", "Updated Kitchen"]),
            main_image: "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800".to_string(),
            images: vec![],
            featured: true,
        },
        ListingDraft {
            title: "Downtown Loft".to_string(),
            price: 329_000.0,
            location: "Downtown".to_string(),
            address: "88 Congress Ave #1402".to_string(),
            property_type: "Apartment".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms: 1,
            bathrooms: 1.5,
            area: 940.0,
            description: "Corner unit with floor-to-ceiling windows and city views.".to_string(),
            features: features(&["Elevator", "Balcony", "Concierge"]),
            main_image: "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800".to_string(),
            images: vec![],
            featured: true,
        },
        ListingDraft {
            title: "Lakeside Cottage".to_string(),
            price: 412_500.0,
            location: "Lake Travis".to_string(),
            address: "17 Shoreline Ct".to_string(),
            property_type: "House".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::Sold,
            bedrooms: 3,
            bathrooms: 2.0,
            area: 1_720.0,
            description: "Quiet cottage a short walk from the water, with a private dock.".to_string(),
            features: features(&["Dock", "Fireplace"]),
            main_image: "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800".to_string(),
            images: vec![],
            featured: false,
        },
        ListingDraft {
            title: "Hill Country Acreage".to_string(),
            price: 210_000.0,
            location: "Dripping Springs".to_string(),
            address: "FM 150 Tract 4".to_string(),
            property_type: "Land".to_string(),
            service_type: ServiceType::Land,
            status: ListingStatus::ForSale,
            bedrooms: 0,
            bathrooms: 0.0,
            area: 217_800.0,
            description: "Five wooded acres with road frontage and utilities at the lot line.".to_string(),
            features: features(&["Road Frontage", "Utilities Available"]),
            main_image: String::new(),
            images: vec![],
            featured: false,
        },
        ListingDraft {
            title: "Craftsman Bungalow".to_string(),
            price: 375_000.0,
            location: "Hyde Park".to_string(),
            address: "4410 Avenue D".to_string(),
            property_type: "House".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms: 3,
            bathrooms: 1.5,
            area: 1_480.0,
            description: "Restored 1920s bungalow with original hardwood floors.".to_string(),
            features: features(&["Porch", "Hardwood Floors"]),
            main_image: "https://images.unsplash.com/photo-1605146769289-440113cc3d00?w=800".to_string(),
            images: vec![],
            featured: false,
        },
        ListingDraft {
            title: "Luxury Estate".to_string(),
            price: 1_250_000.0,
            location: "Westlake Hills".to_string(),
            address: "9 Bella Vista Ln".to_string(),
            property_type: "Villa".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms: 6,
            bathrooms: 5.5,
            area: 6_100.0,
            description: "Gated estate with a pool, guest house and panoramic hill views.".to_string(),
            features: features(&["Pool", "Guest House", "Wine Cellar"]),
            main_image: "https://images.unsplash.com/photo-1512917774080-9991f1c4c750?w=800".to_string(),
            images: vec![],
            featured: true,
        },
        ListingDraft {
            title: "Starter Townhome".to_string(),
            price: 289_000.0,
            location: "Round Rock".to_string(),
            address: "302 Meadow Bend".to_string(),
            property_type: "Townhouse".to_string(),
            service_type: ServiceType::Property,
            status: ListingStatus::ForSale,
            bedrooms: 2,
            bathrooms: 2.5,
            area: 1_310.0,
            description: "Low-maintenance townhome close to schools and parks.".to_string(),
            features: features(&["Community Pool"]),
            main_image: String::new(),
            images: vec![],
            featured: false,
        },
    ]
}
