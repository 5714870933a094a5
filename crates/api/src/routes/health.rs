//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<usize>,
}

/// GET /health: reports whether the store answers, with its row counts.
pub async fn check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match tokio::try_join!(state.customers.count(), state.orders.count()) {
        Ok((customers, orders)) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                customers: Some(customers),
                orders: Some(orders),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    customers: None,
                    orders: None,
                }),
            )
        }
    }
}
