//! Read-side projections for the fulfillment engine.
//!
//! Pure filters over the order store joined to actor identity. Nothing here
//! writes, and nothing is cached: every call re-reads the store, so a view
//! can never show claim state staler than the latest committed transition.

pub mod error;
pub mod summary;
pub mod views;

pub use error::{Result, ViewError};
pub use summary::OrderSummary;
pub use views::{BuyerOrdersView, RiderQueueView, SellerDashboardView, SellerQueueView};
