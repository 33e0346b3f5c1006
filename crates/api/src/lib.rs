//! HTTP API server for the order fulfillment engine.
//!
//! Exposes checkout, the actor-scoped order views, and the status state
//! machine over REST, with structured logging (tracing) and Prometheus
//! metrics. Actor identity comes from the upstream auth layer via the
//! [`auth::AuthActor`] extractor.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{CheckoutCoordinator, StatusService};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::FulfillmentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use views::{BuyerOrdersView, RiderQueueView, SellerDashboardView, SellerQueueView};

/// Shared application state accessible from all handlers.
///
/// Every component takes its own handle to the store; nothing reaches for
/// an ambient database reference.
pub struct AppState<S: FulfillmentStore> {
    pub checkout: CheckoutCoordinator<S>,
    pub status: StatusService<S>,
    pub buyer_orders: BuyerOrdersView<S>,
    pub seller_queue: SellerQueueView<S>,
    pub rider_queue: RiderQueueView<S>,
    pub seller_dashboard: SellerDashboardView<S>,
    pub store: S,
}

/// Creates the application state over a store handle.
pub fn create_state<S: FulfillmentStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        checkout: CheckoutCoordinator::new(store.clone()),
        status: StatusService::new(store.clone()),
        buyer_orders: BuyerOrdersView::new(store.clone()),
        seller_queue: SellerQueueView::new(store.clone()),
        rider_queue: RiderQueueView::new(store.clone()),
        seller_dashboard: SellerDashboardView::new(store.clone()),
        store,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: FulfillmentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::checkout::create::<S>))
        .route("/orders/mine", get(routes::orders::mine::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<S>))
        .route("/sellers/orders", get(routes::orders::seller_queue::<S>))
        .route(
            "/sellers/dashboard",
            get(routes::orders::seller_dashboard::<S>),
        )
        .route("/riders/orders", get(routes::orders::rider_queue::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
