pub mod document;
pub mod firestore;
pub mod memory;
pub mod traits;

pub use firestore::FirestoreRepository;
pub use memory::{sample_listings, MemoryRepository};
pub use traits::{seed_if_empty, ContactRepository, ListingRepository};
