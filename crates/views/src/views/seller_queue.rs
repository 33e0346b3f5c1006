//! Seller order queue.

use common::ActorId;
use order_store::FulfillmentStore;

use crate::summary::summarize;
use crate::{OrderSummary, Result};

/// Orders containing at least one line item whose product belongs to the
/// seller, any status, newest first.
pub struct SellerQueueView<S> {
    store: S,
}

impl<S: FulfillmentStore> SellerQueueView<S> {
    /// Creates the view over the given store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists orders touching the seller's products.
    #[tracing::instrument(skip(self))]
    pub async fn for_seller(&self, seller_id: ActorId) -> Result<Vec<OrderSummary>> {
        let orders = self.store.orders_for_seller(seller_id).await?;
        Ok(summarize(orders))
    }
}
