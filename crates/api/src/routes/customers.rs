//! Customer CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use domain::{Customer, CustomerFilter, CustomerId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{JsonBody, Path, Query};
use crate::routes::orders::OrderResponse;
use crate::routes::{Created, IdQuery, created, observed};
use crate::state::AppState;

const RESOURCE: &str = "customer";

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub registered_at: Option<DateTime<Utc>>,
}

impl CustomerRequest {
    /// Builds the entity; a missing registration time becomes now.
    fn into_customer(self) -> Customer {
        Customer {
            id: CustomerId::new(self.id),
            name: self.name,
            email: self.email,
            registered_at: self.registered_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<CustomerQuery> for CustomerFilter {
    fn from(query: CustomerQuery) -> Self {
        CustomerFilter {
            id: query.id.map(CustomerId::new),
            name: query.name,
            email: query.email,
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.as_i64(),
            name: customer.name,
            email: customer.email,
            registered_at: customer.registered_at,
        }
    }
}

// -- Handlers --

/// GET /api/Customer: list customers matching the optional filters.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    observed(RESOURCE, "list", async move {
        let customers = state.customers.list(query.into()).await?;
        Ok(Json(customers.into_iter().map(Into::into).collect()))
    })
    .await
}

/// GET /api/Customer/:id
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, ApiError> {
    observed(RESOURCE, "get", async move {
        let customer = state.customers.get(CustomerId::new(id)).await?;
        Ok(Json(customer.into()))
    })
    .await
}

/// POST /api/Customer: register a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CustomerRequest>,
) -> Result<Created<CustomerResponse>, ApiError> {
    observed(RESOURCE, "create", async move {
        let customer = req.into_customer();
        customer.validate()?;

        let customer = state.customers.create(customer).await?;
        Ok(created(
            format!("/api/Customer/{}", customer.id),
            customer.into(),
        ))
    })
    .await
}

/// PUT /api/Customer: overwrite the customer whose id is in the body.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    observed(RESOURCE, "update", save(state, req)).await
}

/// PUT /api/Customer/:id: like `update`, but the body id must match the path.
#[tracing::instrument(skip(state, req))]
pub async fn update_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<CustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    observed(RESOURCE, "update", async move {
        if req.id != id {
            return Err(ApiError::BadRequest(
                "The provided ID does not match the customer ID.".to_string(),
            ));
        }
        save(state, req).await
    })
    .await
}

async fn save(
    state: Arc<AppState>,
    req: CustomerRequest,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = req.into_customer();
    customer.validate()?;

    let customer = state.customers.update(customer).await?;
    Ok(Json(customer.into()))
}

/// DELETE /api/Customer?id=: remove a customer.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<CustomerResponse>, ApiError> {
    observed(RESOURCE, "delete", remove(state, query.id_or_zero())).await
}

/// DELETE /api/Customer/:id
#[tracing::instrument(skip(state))]
pub async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, ApiError> {
    observed(RESOURCE, "delete", remove(state, id)).await
}

async fn remove(state: Arc<AppState>, id: i64) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.delete(CustomerId::new(id)).await?;
    Ok(Json(customer.into()))
}

/// GET /api/Customer/:id/orders: orders placed by an existing customer.
#[tracing::instrument(skip(state))]
pub async fn orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    observed(RESOURCE, "orders", async move {
        let orders = state.order_service.orders_for(CustomerId::new(id)).await?;
        Ok(Json(orders.into_iter().map(Into::into).collect()))
    })
    .await
}
