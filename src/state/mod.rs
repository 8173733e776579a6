//! Process-wide containers: favorites, comparison set and the listing cache.
//! Each is an explicit object handed to its consumers, not a global.

pub mod cache;
pub mod comparison;
pub mod favorites;
pub mod snapshot;
pub mod storage;

pub use cache::{CacheSnapshot, ListingCache};
pub use comparison::{Comparison, MAX_COMPARE_ITEMS};
pub use favorites::Favorites;
pub use snapshot::Lifecycle;
pub use storage::{JsonFileStore, LocalStore, MemoryStore};
