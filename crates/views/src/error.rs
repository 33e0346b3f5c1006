use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading a projection.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
