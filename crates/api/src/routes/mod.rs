//! HTTP route handlers.

pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;

pub(crate) use self::metrics::observed;

use axum::Json;
use axum::http::header::{HeaderName, LOCATION};
use axum::http::StatusCode;
use serde::Deserialize;

/// Response for a successful POST: status, `Location` header and body.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn created<T>(location: String, body: T) -> Created<T> {
    (StatusCode::CREATED, [(LOCATION, location)], Json(body))
}

/// `?id=` query used by the DELETE endpoints that take the key as a
/// parameter. A missing id is treated as zero and rejected by the store.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<i64>,
}

impl IdQuery {
    pub fn id_or_zero(&self) -> i64 {
        self.id.unwrap_or_default()
    }
}
