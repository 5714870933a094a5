//! Request counters and the Prometheus scrape endpoint.

use std::future::Future;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::ApiError;

const EXPOSITION_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Runs a handler body and counts its outcome in
/// `api_requests_total{resource, operation, outcome}`.
///
/// Outcome is `success`, `rejected` (4xx) or `error` (5xx).
pub(crate) async fn observed<T>(
    resource: &'static str,
    operation: &'static str,
    body: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let result = body.await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) if err.status().is_client_error() => "rejected",
        Err(_) => "error",
    };
    metrics::counter!(
        "api_requests_total",
        "resource" => resource,
        "operation" => operation,
        "outcome" => outcome,
    )
    .increment(1);
    result
}

/// GET /metrics: renders every recorded metric in the Prometheus text format.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_FORMAT)], handle.render())
}
