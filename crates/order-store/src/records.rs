//! Row-shaped records exchanged with the store.

use chrono::{DateTime, Utc};
use common::{ActorId, Money, OrderId, OrderNumber, OrderStatus, ProductId};
use serde::{Deserialize, Serialize};

/// A product row. Stock is mutated only through the conditional decrement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub seller_id: ActorId,
    pub name: String,
    pub unit_price: Money,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a product. Catalog management proper is an external
/// collaborator; this exists so sellers (and tests) can seed inventory.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: ActorId,
    pub name: String,
    pub unit_price: Money,
    pub stock: i32,
}

/// An order row. Created once at checkout, mutated only through validated
/// status transitions, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub buyer_id: ActorId,
    pub rider_id: Option<ActorId>,
    pub total_amount: Money,
    pub delivery_fee: Money,
    pub payment_method: String,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item row. The unit price is the snapshot captured at purchase
/// time; it is never recomputed from the current product price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_at_purchase: Money,
}

/// One item of a cart about to be materialized.
#[derive(Debug, Clone)]
pub struct LineItemDraft {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Money,
}

/// A fully validated cart ready for the checkout transaction.
///
/// Identity and totals are decided by the coordinator before the store is
/// touched; the store's job is to persist all of it or none of it.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub buyer_id: ActorId,
    pub total_amount: Money,
    pub delivery_fee: Money,
    pub payment_method: String,
    pub delivery_address: String,
    pub items: Vec<LineItemDraft>,
}

/// A validated status transition, applied as a single conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionUpdate {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub guard: TransitionGuard,
}

/// Row-level guard folded into the transition's WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionGuard {
    /// No condition beyond the current-status check.
    None,
    /// Claim: succeeds only while no rider is assigned, and assigns the
    /// caller in the same statement. The affected-row count is the sole
    /// arbiter between racing claimants.
    ClaimRider(ActorId),
    /// Succeeds only if the caller is the assigned rider.
    AssignedRider(ActorId),
}

/// Aggregated seller statistics plus an inventory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerDashboard {
    pub total_revenue: Money,
    pub orders_today: u64,
    pub active_products: u64,
    pub inventory: Vec<InventoryLine>,
}

/// One product in the seller's inventory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub stock: i32,
    pub level: StockLevel,
}

/// Coarse stock level shown on the seller dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Out,
    Low,
    Good,
}

impl StockLevel {
    /// Classifies a stock count. Below 10 counts as low.
    pub fn for_stock(stock: i32) -> Self {
        if stock <= 0 {
            StockLevel::Out
        } else if stock < 10 {
            StockLevel::Low
        } else {
            StockLevel::Good
        }
    }
}
