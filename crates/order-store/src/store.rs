use async_trait::async_trait;
use common::{ActorId, OrderId, ProductId};

use crate::records::{
    LineItemRecord, NewProduct, OrderDraft, OrderRecord, ProductRecord, SellerDashboard,
    TransitionUpdate,
};
use crate::Result;

/// Core trait for fulfillment store implementations.
///
/// Every method is a single atomic unit against the durable store: callers
/// are independent, concurrent, and possibly distributed, so there is no
/// coordination between them other than what these operations guarantee.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait FulfillmentStore: Send + Sync {
    /// Inserts a product with an initial stock count.
    async fn insert_product(&self, product: NewProduct) -> Result<ProductRecord>;

    /// Retrieves a product by id. Returns None if it does not exist.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductRecord>>;

    /// Atomically decrements a product's stock if enough is available.
    ///
    /// This is the Inventory Ledger operation: one conditional update,
    /// "decrement by quantity where stock >= quantity". A zero-row result is
    /// the only insufficient-stock signal; there is no read-check-write.
    /// Not idempotent — each successful call consumes stock exactly once.
    ///
    /// Fails with [`StoreError::InsufficientStock`] when stock is short and
    /// [`StoreError::ProductNotFound`] when the product does not exist.
    ///
    /// [`StoreError::InsufficientStock`]: crate::StoreError::InsufficientStock
    /// [`StoreError::ProductNotFound`]: crate::StoreError::ProductNotFound
    async fn reserve(&self, product_id: ProductId, quantity: i32) -> Result<()>;

    /// Materializes a cart into an order as one all-or-nothing unit.
    ///
    /// Inserts the order row in `pending`, then for each item inserts the
    /// line item row and reserves its stock. Any failed reservation aborts
    /// the entire transaction — the order, every line item, and every stock
    /// decrement already applied in this call. Partial fulfillment is never
    /// observable outside the transaction.
    async fn checkout(&self, draft: OrderDraft) -> Result<OrderRecord>;

    /// Retrieves an order by id. Returns None if it does not exist.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderRecord>>;

    /// Retrieves the line items belonging to an order.
    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItemRecord>>;

    /// Returns true if at least one of the order's line items references a
    /// product owned by the given seller.
    async fn seller_owns_line_items(&self, order_id: OrderId, seller_id: ActorId) -> Result<bool>;

    /// Applies a validated status transition as a single conditional update.
    ///
    /// The WHERE clause carries the expected current status plus the
    /// update's guard; the caller must inspect the result — `Ok(None)`
    /// means zero rows matched, i.e. the order is gone, its status moved
    /// concurrently, or (for a claim) another rider won. Those cases are
    /// indistinguishable at this layer by design.
    async fn apply_transition(
        &self,
        order_id: OrderId,
        update: TransitionUpdate,
    ) -> Result<Option<OrderRecord>>;

    /// All orders placed by the buyer, newest first.
    async fn orders_by_buyer(&self, buyer_id: ActorId) -> Result<Vec<OrderRecord>>;

    /// All orders containing at least one line item whose product belongs
    /// to the seller, any status, newest first.
    async fn orders_for_seller(&self, seller_id: ActorId) -> Result<Vec<OrderRecord>>;

    /// The rider's queue: unclaimed orders in `ready_for_pickup` (the open
    /// pool) plus orders already assigned to this rider, newest first.
    async fn orders_for_rider(&self, rider_id: ActorId) -> Result<Vec<OrderRecord>>;

    /// Aggregated statistics for the seller dashboard.
    async fn seller_dashboard(&self, seller_id: ActorId) -> Result<SellerDashboard>;
}
