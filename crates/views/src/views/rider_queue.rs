//! Rider delivery queue.

use common::ActorId;
use order_store::FulfillmentStore;

use crate::summary::summarize;
use crate::{OrderSummary, Result};

/// The union of the open pool (prepared orders with no rider) and the
/// orders already assigned to this rider, newest first.
pub struct RiderQueueView<S> {
    store: S,
}

impl<S: FulfillmentStore> RiderQueueView<S> {
    /// Creates the view over the given store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists the rider's queue.
    #[tracing::instrument(skip(self))]
    pub async fn for_rider(&self, rider_id: ActorId) -> Result<Vec<OrderSummary>> {
        let orders = self.store.orders_for_rider(rider_id).await?;
        Ok(summarize(orders))
    }
}
