//! The actor-scoped read projections.

mod buyer_orders;
mod rider_queue;
mod seller_dashboard;
mod seller_queue;

pub use buyer_orders::BuyerOrdersView;
pub use rider_queue::RiderQueueView;
pub use seller_dashboard::SellerDashboardView;
pub use seller_queue::SellerQueueView;
