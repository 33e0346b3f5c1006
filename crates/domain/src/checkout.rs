//! Checkout transaction coordination.

use chrono::Utc;
use common::{Actor, Money, OrderId, OrderNumber, ProductId, Role};
use order_store::{FulfillmentStore, LineItemDraft, OrderDraft, OrderRecord, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::FulfillmentError;

/// Delivery fee applied when the caller does not specify one.
pub const DEFAULT_DELIVERY_FEE: Money = Money::from_cents(1000);

/// How many fresh order numbers to try when generation collides with an
/// existing order. The unique constraint stays authoritative either way.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// One item of the caller's cart snapshot.
///
/// The unit price is the snapshot the buyer saw; it is totaled as-is and
/// captured on the line item, not re-read from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Money,
}

/// A checkout request as it arrives from the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub delivery_address: String,
    pub payment_method: String,
    pub delivery_fee: Option<Money>,
}

/// Composes the inventory ledger and the order store into one all-or-nothing
/// checkout.
///
/// Validation happens here, before any store access; atomicity is the
/// store's transaction boundary. On success stock is permanently consumed;
/// on any failure nothing is.
pub struct CheckoutCoordinator<S> {
    store: S,
}

impl<S: FulfillmentStore> CheckoutCoordinator<S> {
    /// Creates a coordinator over the given store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Materializes the buyer's cart into a pending order.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn checkout(
        &self,
        actor: Actor,
        request: CheckoutRequest,
    ) -> Result<OrderRecord, FulfillmentError> {
        if !actor.has_role(Role::Buyer) {
            return Err(FulfillmentError::NotAuthorized);
        }
        validate(&request)?;

        let delivery_fee = request.delivery_fee.unwrap_or(DEFAULT_DELIVERY_FEE);
        let items_total: Money = request
            .items
            .iter()
            .map(|item| item.unit_price.multiply(item.quantity as u32))
            .sum();
        let total_amount = items_total + delivery_fee;

        let items: Vec<LineItemDraft> = request
            .items
            .iter()
            .map(|item| LineItemDraft {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let started = std::time::Instant::now();
        let mut attempt = 1;
        loop {
            let draft = OrderDraft {
                id: OrderId::new(),
                order_number: generate_order_number(),
                buyer_id: actor.id,
                total_amount,
                delivery_fee,
                payment_method: request.payment_method.clone(),
                delivery_address: request.delivery_address.clone(),
                items: items.clone(),
            };

            match self.store.checkout(draft).await {
                Ok(order) => {
                    metrics::counter!("checkout_completed").increment(1);
                    metrics::histogram!("checkout_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    tracing::info!(
                        order_id = %order.id,
                        order_number = %order.order_number,
                        total = %order.total_amount,
                        "order placed"
                    );
                    return Ok(order);
                }
                Err(StoreError::DuplicateOrderNumber(number))
                    if attempt < ORDER_NUMBER_ATTEMPTS =>
                {
                    tracing::warn!(%number, attempt, "order number collision, regenerating");
                    attempt += 1;
                }
                Err(e) => {
                    if matches!(e, StoreError::InsufficientStock { .. }) {
                        metrics::counter!("checkout_insufficient_stock").increment(1);
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn validate(request: &CheckoutRequest) -> Result<(), FulfillmentError> {
    if request.items.is_empty() {
        return Err(FulfillmentError::Validation("cart is empty".to_string()));
    }
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(FulfillmentError::Validation(format!(
                "quantity must be positive for product {}",
                item.product_id
            )));
        }
        if item.unit_price.is_negative() {
            return Err(FulfillmentError::Validation(format!(
                "unit price must not be negative for product {}",
                item.product_id
            )));
        }
    }
    if request.delivery_fee.is_some_and(|fee| fee.is_negative()) {
        return Err(FulfillmentError::Validation(
            "delivery fee must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Generates an order number like `ORD-1678234000123-543`: millisecond time
/// prefix plus a random suffix. Uniqueness is advisory only; the store's
/// constraint is what actually enforces it.
fn generate_order_number() -> OrderNumber {
    let millis = Utc::now().timestamp_millis();
    let suffix = (Uuid::new_v4().as_u128() % 1000) as u16;
    OrderNumber::new(format!("ORD-{millis}-{suffix:03}"))
}
