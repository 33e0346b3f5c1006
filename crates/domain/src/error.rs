//! Domain error taxonomy.

use common::{OrderId, OrderStatus, ProductId};
use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by checkout and status operations.
///
/// Everything except `Storage` is a typed rejection the caller can act on:
/// the operation left no partial state behind. `Storage` means the effect of
/// the operation is unknown and the caller must re-fetch before retrying.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Malformed or empty input, rejected before any store access.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A product ran out during checkout; the whole checkout was aborted.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The transition is not permitted from the order's current status.
    #[error("cannot move to {requested} from {current}")]
    WrongState {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// Lost the claim race: another rider won the conditional update first.
    #[error("order is no longer available")]
    AlreadyClaimed,

    /// The actor lacks the role or ownership the operation requires.
    #[error("not authorized for this operation")]
    NotAuthorized,

    /// The durable store failed; the operation may or may not have applied.
    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl FulfillmentError {
    /// Machine-readable rejection reason, stable across messages.
    pub fn reason(&self) -> &'static str {
        match self {
            FulfillmentError::Validation(_) => "validation_error",
            FulfillmentError::InsufficientStock { .. } => "insufficient_stock",
            FulfillmentError::OrderNotFound(_) | FulfillmentError::ProductNotFound(_) => {
                "not_found"
            }
            FulfillmentError::WrongState { .. } => "wrong_current_state",
            FulfillmentError::AlreadyClaimed => "already_claimed",
            FulfillmentError::NotAuthorized => "not_authorized",
            FulfillmentError::Storage(_) => "storage_failure",
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InsufficientStock { product_id } => {
                FulfillmentError::InsufficientStock { product_id }
            }
            StoreError::ProductNotFound(product_id) => {
                FulfillmentError::ProductNotFound(product_id)
            }
            other => FulfillmentError::Storage(other),
        }
    }
}
