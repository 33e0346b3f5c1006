//! Order views and status transitions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{OrderId, OrderStatus};
use order_store::{FulfillmentStore, LineItemRecord, OrderRecord, SellerDashboard};
use serde::{Deserialize, Serialize};
use views::OrderSummary;

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub buyer_id: String,
    pub rider_id: Option<String>,
    pub total_amount: i64,
    pub delivery_fee: i64,
    pub payment_method: String,
    pub delivery_address: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: i32,
    pub price_at_purchase: i64,
}

fn order_response(order: OrderRecord, items: Vec<LineItemRecord>) -> OrderResponse {
    OrderResponse {
        id: order.id.to_string(),
        order_number: order.order_number.to_string(),
        status: order.status,
        buyer_id: order.buyer_id.to_string(),
        rider_id: order.rider_id.map(|id| id.to_string()),
        total_amount: order.total_amount.cents(),
        delivery_fee: order.delivery_fee.cents(),
        payment_method: order.payment_method,
        delivery_address: order.delivery_address,
        created_at: order.created_at.to_rfc3339(),
        updated_at: order.updated_at.to_rfc3339(),
        items: items
            .into_iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase.cents(),
            })
            .collect(),
    }
}

// -- Handlers --

/// GET /orders/{id} — fetch one order with its line items.
#[tracing::instrument(skip(state, _actor))]
pub async fn get<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .store
        .get_order(order_id)
        .await
        .map_err(|e| ApiError::Fulfillment(e.into()))?
        .ok_or_else(|| {
            ApiError::Fulfillment(domain::FulfillmentError::OrderNotFound(order_id))
        })?;
    let items = state
        .store
        .line_items(order_id)
        .await
        .map_err(|e| ApiError::Fulfillment(e.into()))?;

    Ok(Json(order_response(order, items)))
}

/// GET /orders/mine — the caller's order history, newest first.
#[tracing::instrument(skip(state))]
pub async fn mine<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let orders = state.buyer_orders.for_buyer(actor.id).await?;
    Ok(Json(orders))
}

/// GET /sellers/orders — orders touching the caller's products.
#[tracing::instrument(skip(state))]
pub async fn seller_queue<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let orders = state.seller_queue.for_seller(actor.id).await?;
    Ok(Json(orders))
}

/// GET /sellers/dashboard — revenue, today's orders, and inventory levels.
#[tracing::instrument(skip(state))]
pub async fn seller_dashboard<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
) -> Result<Json<SellerDashboard>, ApiError> {
    let dashboard = state.seller_dashboard.for_seller(actor.id).await?;
    Ok(Json(dashboard))
}

/// GET /riders/orders — the open pool plus the caller's claimed orders.
#[tracing::instrument(skip(state))]
pub async fn rider_queue<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let orders = state.rider_queue.for_rider(actor.id).await?;
    Ok(Json(orders))
}

/// PUT /orders/{id}/status — advance the order's status as the caller.
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S: FulfillmentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .status
        .update_status(order_id, actor, body.status)
        .await?;
    let items = state
        .store
        .line_items(order_id)
        .await
        .map_err(|e| ApiError::Fulfillment(e.into()))?;

    Ok(Json(order_response(order, items)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
