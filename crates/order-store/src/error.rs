use common::{OrderNumber, ProductId};
use thiserror::Error;

/// Errors that can occur when interacting with the fulfillment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional stock decrement matched zero rows because the product
    /// does not hold enough stock. The whole enclosing operation was rolled
    /// back; no stock was consumed.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// A referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order number collided with an existing order. Order numbers are
    /// unique under a storage-level constraint; callers may regenerate and
    /// retry.
    #[error("duplicate order number: {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// A stored status string did not parse into a known status.
    #[error("invalid status value in store: {0}")]
    InvalidStatus(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
