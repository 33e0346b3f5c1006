use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{ActorId, Money, OrderId, OrderStatus, ProductId};
use tokio::sync::RwLock;

use crate::records::{
    InventoryLine, LineItemRecord, NewProduct, OrderDraft, OrderRecord, ProductRecord,
    SellerDashboard, StockLevel, TransitionGuard, TransitionUpdate,
};
use crate::store::FulfillmentStore;
use crate::{Result, StoreError};

#[derive(Default)]
struct Inner {
    products: HashMap<ProductId, ProductRecord>,
    orders: HashMap<OrderId, OrderRecord>,
    items: HashMap<OrderId, Vec<LineItemRecord>>,
    order_numbers: HashSet<String>,
}

/// In-memory fulfillment store implementation for testing.
///
/// Provides the same per-operation atomicity as the PostgreSQL
/// implementation: each operation runs under one write guard, so a failed
/// checkout leaves no partial state and racing claims still have exactly
/// one winner.
#[derive(Clone, Default)]
pub struct InMemoryFulfillmentStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryFulfillmentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Returns the total number of line item rows stored.
    pub async fn line_item_count(&self) -> usize {
        self.inner.read().await.items.values().map(Vec::len).sum()
    }
}

fn sorted_newest_first(mut orders: Vec<OrderRecord>) -> Vec<OrderRecord> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl FulfillmentStore for InMemoryFulfillmentStore {
    async fn insert_product(&self, product: NewProduct) -> Result<ProductRecord> {
        let record = ProductRecord {
            id: ProductId::new(),
            seller_id: product.seller_id,
            name: product.name,
            unit_price: product.unit_price,
            stock: product.stock,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductRecord>> {
        Ok(self.inner.read().await.products.get(&product_id).cloned())
    }

    async fn reserve(&self, product_id: ProductId, quantity: i32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock { product_id });
        }

        product.stock -= quantity;
        Ok(())
    }

    async fn checkout(&self, draft: OrderDraft) -> Result<OrderRecord> {
        let mut inner = self.inner.write().await;

        if inner.order_numbers.contains(draft.order_number.as_str()) {
            return Err(StoreError::DuplicateOrderNumber(draft.order_number));
        }

        // Validate every reservation before mutating anything, so a failed
        // item leaves no order, no line items, and no decrements behind.
        for item in &draft.items {
            let product = inner
                .products
                .get(&item.product_id)
                .ok_or(StoreError::ProductNotFound(item.product_id))?;
            if product.stock < item.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: item.product_id,
                });
            }
        }

        for item in &draft.items {
            if let Some(product) = inner.products.get_mut(&item.product_id) {
                product.stock -= item.quantity;
            }
        }

        let now = Utc::now();
        let order = OrderRecord {
            id: draft.id,
            order_number: draft.order_number.clone(),
            buyer_id: draft.buyer_id,
            rider_id: None,
            total_amount: draft.total_amount,
            delivery_fee: draft.delivery_fee,
            payment_method: draft.payment_method,
            delivery_address: draft.delivery_address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let line_items = draft
            .items
            .iter()
            .map(|item| LineItemRecord {
                order_id: draft.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.unit_price,
            })
            .collect();

        inner
            .order_numbers
            .insert(draft.order_number.as_str().to_string());
        inner.orders.insert(draft.id, order.clone());
        inner.items.insert(draft.id, line_items);

        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.inner.read().await.orders.get(&order_id).cloned())
    }

    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItemRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .items
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn seller_owns_line_items(&self, order_id: OrderId, seller_id: ActorId) -> Result<bool> {
        let inner = self.inner.read().await;
        let Some(items) = inner.items.get(&order_id) else {
            return Ok(false);
        };

        Ok(items.iter().any(|item| {
            inner
                .products
                .get(&item.product_id)
                .is_some_and(|p| p.seller_id == seller_id)
        }))
    }

    async fn apply_transition(
        &self,
        order_id: OrderId,
        update: TransitionUpdate,
    ) -> Result<Option<OrderRecord>> {
        let mut inner = self.inner.write().await;
        let Some(order) = inner.orders.get_mut(&order_id) else {
            return Ok(None);
        };

        if order.status != update.from {
            return Ok(None);
        }

        match update.guard {
            TransitionGuard::None => {}
            TransitionGuard::ClaimRider(rider_id) => {
                if order.rider_id.is_some() {
                    return Ok(None);
                }
                order.rider_id = Some(rider_id);
            }
            TransitionGuard::AssignedRider(rider_id) => {
                if order.rider_id != Some(rider_id) {
                    return Ok(None);
                }
            }
        }

        order.status = update.to;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn orders_by_buyer(&self, buyer_id: ActorId) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let orders = inner
            .orders
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(orders))
    }

    async fn orders_for_seller(&self, seller_id: ActorId) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let orders = inner
            .orders
            .values()
            .filter(|o| {
                inner.items.get(&o.id).is_some_and(|items| {
                    items.iter().any(|item| {
                        inner
                            .products
                            .get(&item.product_id)
                            .is_some_and(|p| p.seller_id == seller_id)
                    })
                })
            })
            .cloned()
            .collect();
        Ok(sorted_newest_first(orders))
    }

    async fn orders_for_rider(&self, rider_id: ActorId) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let orders = inner
            .orders
            .values()
            .filter(|o| {
                (o.status == OrderStatus::ReadyForPickup && o.rider_id.is_none())
                    || o.rider_id == Some(rider_id)
            })
            .cloned()
            .collect();
        Ok(sorted_newest_first(orders))
    }

    async fn seller_dashboard(&self, seller_id: ActorId) -> Result<SellerDashboard> {
        let inner = self.inner.read().await;
        let today = Utc::now().date_naive();

        let mut total_revenue = Money::zero();
        let mut orders_today = HashSet::new();
        for (order_id, items) in &inner.items {
            for item in items {
                let owned = inner
                    .products
                    .get(&item.product_id)
                    .is_some_and(|p| p.seller_id == seller_id);
                if !owned {
                    continue;
                }

                total_revenue += item.price_at_purchase.multiply(item.quantity as u32);
                let placed_today = inner
                    .orders
                    .get(order_id)
                    .is_some_and(|o| o.created_at.date_naive() == today);
                if placed_today {
                    orders_today.insert(*order_id);
                }
            }
        }

        let mut products: Vec<&ProductRecord> = inner
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let inventory = products
            .iter()
            .map(|p| InventoryLine {
                product_id: p.id,
                name: p.name.clone(),
                unit_price: p.unit_price,
                stock: p.stock,
                level: StockLevel::for_stock(p.stock),
            })
            .collect::<Vec<_>>();

        Ok(SellerDashboard {
            total_revenue,
            orders_today: orders_today.len() as u64,
            active_products: inventory.len() as u64,
            inventory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LineItemDraft;
    use common::OrderNumber;

    async fn seed_product(store: &InMemoryFulfillmentStore, stock: i32) -> ProductRecord {
        store
            .insert_product(NewProduct {
                seller_id: ActorId::new(),
                name: "Widget".to_string(),
                unit_price: Money::from_cents(500),
                stock,
            })
            .await
            .unwrap()
    }

    fn draft_for(buyer_id: ActorId, items: Vec<LineItemDraft>) -> OrderDraft {
        let item_total: Money = items.iter().map(|i| i.unit_price.multiply(i.quantity as u32)).sum();
        OrderDraft {
            id: OrderId::new(),
            order_number: OrderNumber::new(format!("ORD-{}", OrderId::new())),
            buyer_id,
            total_amount: item_total + Money::from_cents(1000),
            delivery_fee: Money::from_cents(1000),
            payment_method: "card".to_string(),
            delivery_address: "12 Market Road".to_string(),
            items,
        }
    }

    #[tokio::test]
    async fn reserve_decrements_stock() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 5).await;

        store.reserve(product.id, 3).await.unwrap();

        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
    }

    #[tokio::test]
    async fn reserve_rejects_when_stock_is_short() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 2).await;

        let err = store.reserve(product.id, 3).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { .. }));

        // Nothing consumed on failure
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
    }

    #[tokio::test]
    async fn reserve_unknown_product() {
        let store = InMemoryFulfillmentStore::new();
        let err = store.reserve(ProductId::new(), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn checkout_persists_order_and_items() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 10).await;
        let buyer_id = ActorId::new();

        let order = store
            .checkout(draft_for(
                buyer_id,
                vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 2,
                    unit_price: Money::from_cents(500),
                }],
            ))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.rider_id, None);
        assert_eq!(order.total_amount.cents(), 2000);

        let items = store.line_items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 8);
    }

    #[tokio::test]
    async fn checkout_rolls_back_when_last_item_is_short() {
        let store = InMemoryFulfillmentStore::new();
        let p1 = seed_product(&store, 10).await;
        let p2 = seed_product(&store, 10).await;
        let p3 = seed_product(&store, 1).await;

        let items = [p1.id, p2.id, p3.id]
            .into_iter()
            .map(|product_id| LineItemDraft {
                product_id,
                quantity: 2,
                unit_price: Money::from_cents(500),
            })
            .collect();

        let err = store.checkout(draft_for(ActorId::new(), items)).await.unwrap_err();
        assert!(
            matches!(err, StoreError::InsufficientStock { product_id } if product_id == p3.id)
        );

        // Full rollback: no order, no items, no decrement on any product
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
        assert_eq!(store.get_product(p1.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.get_product(p2.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.get_product(p3.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn checkout_rejects_duplicate_order_number() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 10).await;

        let mut first = draft_for(
            ActorId::new(),
            vec![LineItemDraft {
                product_id: product.id,
                quantity: 1,
                unit_price: Money::from_cents(500),
            }],
        );
        first.order_number = OrderNumber::new("ORD-1-001");
        store.checkout(first).await.unwrap();

        let mut second = draft_for(
            ActorId::new(),
            vec![LineItemDraft {
                product_id: product.id,
                quantity: 1,
                unit_price: Money::from_cents(500),
            }],
        );
        second.order_number = OrderNumber::new("ORD-1-001");

        let err = store.checkout(second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrderNumber(_)));
    }

    #[tokio::test]
    async fn claim_has_exactly_one_winner() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 10).await;

        let order = store
            .checkout(draft_for(
                ActorId::new(),
                vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: Money::from_cents(500),
                }],
            ))
            .await
            .unwrap();

        store
            .apply_transition(
                order.id,
                TransitionUpdate {
                    from: OrderStatus::Pending,
                    to: OrderStatus::ReadyForPickup,
                    guard: TransitionGuard::None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        let r1 = ActorId::new();
        let r2 = ActorId::new();
        let claim = |rider| TransitionUpdate {
            from: OrderStatus::ReadyForPickup,
            to: OrderStatus::InTransit,
            guard: TransitionGuard::ClaimRider(rider),
        };

        let won = store
            .apply_transition(order.id, claim(r1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(won.status, OrderStatus::InTransit);
        assert_eq!(won.rider_id, Some(r1));

        let lost = store.apply_transition(order.id, claim(r2)).await.unwrap();
        assert!(lost.is_none());

        // The winner's assignment is untouched by the losing claim
        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.rider_id, Some(r1));
    }

    #[tokio::test]
    async fn transition_from_stale_state_matches_nothing() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 10).await;

        let order = store
            .checkout(draft_for(
                ActorId::new(),
                vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: Money::from_cents(500),
                }],
            ))
            .await
            .unwrap();

        // Order is pending; an in_transit -> delivered update matches nothing
        let result = store
            .apply_transition(
                order.id,
                TransitionUpdate {
                    from: OrderStatus::InTransit,
                    to: OrderStatus::Delivered,
                    guard: TransitionGuard::None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn rider_queue_unions_pool_and_claimed() {
        let store = InMemoryFulfillmentStore::new();
        let product = seed_product(&store, 10).await;
        let rider = ActorId::new();

        let make_order = || {
            draft_for(
                ActorId::new(),
                vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: Money::from_cents(500),
                }],
            )
        };

        let pending = store.checkout(make_order()).await.unwrap();
        let pool = store.checkout(make_order()).await.unwrap();
        let claimed = store.checkout(make_order()).await.unwrap();

        for id in [pool.id, claimed.id] {
            store
                .apply_transition(
                    id,
                    TransitionUpdate {
                        from: OrderStatus::Pending,
                        to: OrderStatus::ReadyForPickup,
                        guard: TransitionGuard::None,
                    },
                )
                .await
                .unwrap()
                .unwrap();
        }
        store
            .apply_transition(
                claimed.id,
                TransitionUpdate {
                    from: OrderStatus::ReadyForPickup,
                    to: OrderStatus::InTransit,
                    guard: TransitionGuard::ClaimRider(rider),
                },
            )
            .await
            .unwrap()
            .unwrap();

        let queue = store.orders_for_rider(rider).await.unwrap();
        let ids: Vec<OrderId> = queue.iter().map(|o| o.id).collect();
        assert!(ids.contains(&pool.id));
        assert!(ids.contains(&claimed.id));
        assert!(!ids.contains(&pending.id));

        // Another rider sees the pool but not the claimed order
        let other = store.orders_for_rider(ActorId::new()).await.unwrap();
        let other_ids: Vec<OrderId> = other.iter().map(|o| o.id).collect();
        assert!(other_ids.contains(&pool.id));
        assert!(!other_ids.contains(&claimed.id));
    }

    #[tokio::test]
    async fn seller_dashboard_aggregates() {
        let store = InMemoryFulfillmentStore::new();
        let seller = ActorId::new();

        let product = store
            .insert_product(NewProduct {
                seller_id: seller,
                name: "Widget".to_string(),
                unit_price: Money::from_cents(500),
                stock: 12,
            })
            .await
            .unwrap();
        store
            .insert_product(NewProduct {
                seller_id: seller,
                name: "Gadget".to_string(),
                unit_price: Money::from_cents(900),
                stock: 0,
            })
            .await
            .unwrap();

        store
            .checkout(draft_for(
                ActorId::new(),
                vec![LineItemDraft {
                    product_id: product.id,
                    quantity: 4,
                    unit_price: Money::from_cents(500),
                }],
            ))
            .await
            .unwrap();

        let dashboard = store.seller_dashboard(seller).await.unwrap();
        assert_eq!(dashboard.total_revenue.cents(), 2000);
        assert_eq!(dashboard.orders_today, 1);
        assert_eq!(dashboard.active_products, 2);
        assert_eq!(dashboard.inventory.len(), 2);
        assert!(dashboard
            .inventory
            .iter()
            .any(|line| line.level == StockLevel::Out));
    }
}
