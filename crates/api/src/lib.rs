//! HTTP API server with observability for the customer and order service.
//!
//! Provides REST endpoints for customer and order management, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/Customer",
            get(routes::customers::list)
                .post(routes::customers::create)
                .put(routes::customers::update)
                .delete(routes::customers::delete),
        )
        .route(
            "/api/Customer/{id}",
            get(routes::customers::get)
                .put(routes::customers::update_by_id)
                .delete(routes::customers::delete_by_id),
        )
        .route("/api/Customer/{id}/orders", get(routes::customers::orders))
        .route(
            "/api/Order",
            get(routes::orders::list)
                .post(routes::orders::create)
                .put(routes::orders::update)
                .delete(routes::orders::delete),
        )
        .route(
            "/api/Order/{id}",
            get(routes::orders::get)
                .put(routes::orders::update_by_id)
                .delete(routes::orders::delete_by_id),
        )
        .route("/api/Order/{id}/cancel", post(routes::orders::cancel))
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
