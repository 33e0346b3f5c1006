//! Order summaries served to actors.

use chrono::{DateTime, Utc};
use common::{ActorId, Money, OrderId, OrderNumber, OrderStatus};
use order_store::OrderRecord;
use serde::Serialize;

/// What an actor sees of an order in a list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub delivery_fee: Money,
    pub delivery_address: String,
    pub rider_id: Option<ActorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRecord> for OrderSummary {
    fn from(order: OrderRecord) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            total_amount: order.total_amount,
            delivery_fee: order.delivery_fee,
            delivery_address: order.delivery_address,
            rider_id: order.rider_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

pub(crate) fn summarize(orders: Vec<OrderRecord>) -> Vec<OrderSummary> {
    orders.into_iter().map(OrderSummary::from).collect()
}
