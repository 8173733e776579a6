//! Admin console operations: listing creation and image replacement with
//! uploads, and the optimistic dashboard actions.

pub mod commands;
pub mod create;
pub mod edit;

pub use commands::{AdminCommand, Dashboard, DashboardSummary};
pub use create::{create_listing, CreateError, CreatedListing};
pub use edit::replace_images;
