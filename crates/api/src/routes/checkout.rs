//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{Money, ProductId};
use domain::{CartItem, CheckoutRequest};
use order_store::FulfillmentStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CheckoutBody {
    pub items: Vec<CartItemBody>,
    pub delivery_address: String,
    pub payment_method: String,
    /// Minor currency units; defaults server-side when omitted.
    pub delivery_fee: Option<i64>,
}

#[derive(Deserialize)]
pub struct CartItemBody {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price from the buyer's cart snapshot, in minor units.
    pub unit_price: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub order_number: String,
}

// -- Handlers --

/// POST /orders — materialize the caller's cart into a pending order.
#[tracing::instrument(skip(state, actor, body))]
pub async fn create<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let request = CheckoutRequest {
        items: body
            .items
            .iter()
            .map(|item| CartItem {
                product_id: ProductId::from_uuid(item.product_id),
                quantity: item.quantity,
                unit_price: Money::from_cents(item.unit_price),
            })
            .collect(),
        delivery_address: body.delivery_address,
        payment_method: body.payment_method,
        delivery_fee: body.delivery_fee.map(Money::from_cents),
    };

    let order = state.checkout.checkout(actor, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.id.to_string(),
            order_number: order.order_number.to_string(),
        }),
    ))
}
