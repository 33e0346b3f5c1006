//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::FulfillmentError;
use views::ViewError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed actor context.
    Unauthorized(String),
    /// Bad request from the client.
    BadRequest(String),
    /// A typed rejection from the fulfillment engine.
    Fulfillment(FulfillmentError),
    /// A read-side failure.
    View(ViewError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg, "reason": "unauthorized" }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg, "reason": "validation_error" }),
            ),
            ApiError::Fulfillment(err) => fulfillment_error_to_response(err),
            ApiError::View(err) => {
                tracing::error!(error = %err, "view read failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": err.to_string(), "reason": "storage_failure" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Maps the domain taxonomy onto status codes, carrying enough structured
/// data for the client to re-render the current correct state.
fn fulfillment_error_to_response(err: FulfillmentError) -> (StatusCode, serde_json::Value) {
    let reason = err.reason();
    match &err {
        FulfillmentError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": err.to_string(), "reason": reason }),
        ),
        FulfillmentError::InsufficientStock { product_id } => (
            StatusCode::CONFLICT,
            serde_json::json!({
                "error": err.to_string(),
                "reason": reason,
                "product_id": product_id,
            }),
        ),
        FulfillmentError::OrderNotFound(_) | FulfillmentError::ProductNotFound(_) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": err.to_string(), "reason": reason }),
        ),
        FulfillmentError::WrongState { current, .. } => (
            StatusCode::CONFLICT,
            serde_json::json!({
                "error": err.to_string(),
                "reason": reason,
                "current_status": current,
            }),
        ),
        FulfillmentError::AlreadyClaimed => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": err.to_string(), "reason": reason }),
        ),
        FulfillmentError::NotAuthorized => (
            StatusCode::FORBIDDEN,
            serde_json::json!({ "error": err.to_string(), "reason": reason }),
        ),
        FulfillmentError::Storage(inner) => {
            tracing::error!(error = %inner, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": err.to_string(), "reason": reason }),
            )
        }
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        ApiError::Fulfillment(err)
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::View(err)
    }
}
