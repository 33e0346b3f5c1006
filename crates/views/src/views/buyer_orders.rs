//! Buyer order history.

use common::ActorId;
use order_store::FulfillmentStore;

use crate::summary::summarize;
use crate::{OrderSummary, Result};

/// All orders placed by a buyer, newest first.
pub struct BuyerOrdersView<S> {
    store: S,
}

impl<S: FulfillmentStore> BuyerOrdersView<S> {
    /// Creates the view over the given store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists the buyer's own orders.
    #[tracing::instrument(skip(self))]
    pub async fn for_buyer(&self, buyer_id: ActorId) -> Result<Vec<OrderSummary>> {
        let orders = self.store.orders_by_buyer(buyer_id).await?;
        Ok(summarize(orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, OrderId, OrderNumber};
    use order_store::{InMemoryFulfillmentStore, LineItemDraft, NewProduct, OrderDraft};

    async fn place_order(store: &InMemoryFulfillmentStore, buyer_id: ActorId) -> OrderId {
        let product = store
            .insert_product(NewProduct {
                seller_id: ActorId::new(),
                name: "Widget".to_string(),
                unit_price: Money::from_cents(500),
                stock: 10,
            })
            .await
            .unwrap();

        let id = OrderId::new();
        store
            .checkout(OrderDraft {
                id,
                order_number: OrderNumber::new(format!("ORD-{id}")),
                buyer_id,
                total_amount: Money::from_cents(1500),
                delivery_fee: Money::from_cents(1000),
                payment_method: "card".to_string(),
                delivery_address: "12 Market Road".to_string(),
                items: vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: Money::from_cents(500),
                }],
            })
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn only_the_buyers_orders_newest_first() {
        let store = InMemoryFulfillmentStore::new();
        let buyer = ActorId::new();

        let first = place_order(&store, buyer).await;
        let second = place_order(&store, buyer).await;
        place_order(&store, ActorId::new()).await;

        let view = BuyerOrdersView::new(store);
        let summaries = view.for_buyer(buyer).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, second);
        assert_eq!(summaries[1].id, first);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let store = InMemoryFulfillmentStore::new();
        let buyer = ActorId::new();
        place_order(&store, buyer).await;

        let view = BuyerOrdersView::new(store);
        let first = view.for_buyer(buyer).await.unwrap();
        let second = view.for_buyer(buyer).await.unwrap();
        assert_eq!(first, second);
    }
}
