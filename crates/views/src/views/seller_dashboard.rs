//! Seller dashboard statistics.

use common::ActorId;
use order_store::{FulfillmentStore, SellerDashboard};

use crate::Result;

/// Revenue, today's order count, and the inventory listing for one seller.
pub struct SellerDashboardView<S> {
    store: S,
}

impl<S: FulfillmentStore> SellerDashboardView<S> {
    /// Creates the view over the given store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Computes the seller's dashboard.
    #[tracing::instrument(skip(self))]
    pub async fn for_seller(&self, seller_id: ActorId) -> Result<SellerDashboard> {
        Ok(self.store.seller_dashboard(seller_id).await?)
    }
}
