//! Order CRUD and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use domain::{CustomerId, Money, Order, OrderFilter, OrderId, OrderItem, status};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{JsonBody, Path, Query};
use crate::routes::{Created, IdQuery, created, observed};
use crate::state::AppState;

const RESOURCE: &str = "order";

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub customer_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    #[serde(default)]
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub unit_price_cents: i64,
}

impl OrderRequest {
    /// Builds the entity. A missing creation time becomes now and a missing
    /// status becomes `Pending`.
    fn into_order(self) -> Order {
        Order {
            id: OrderId::new(self.id),
            customer_id: CustomerId::new(self.customer_id),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            delivery_date: self.delivery_date,
            status: self.status.unwrap_or_else(|| status::PENDING.to_string()),
            total_amount: Money::from_cents(self.total_amount_cents),
            notes: self.notes,
            items: self
                .items
                .into_iter()
                .map(|item| {
                    OrderItem::new(
                        item.product_name,
                        item.quantity,
                        Money::from_cents(item.unit_price_cents),
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub customer_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl From<OrderQuery> for OrderFilter {
    fn from(query: OrderQuery) -> Self {
        OrderFilter {
            customer_id: query.customer_id.map(CustomerId::new),
            date_from: query.date_from,
            date_to: query.date_to,
            status: query.status,
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub created_at: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: String,
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub order_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id.as_i64(),
            order_id: item.order_id.as_i64(),
            subtotal_cents: item.subtotal().cents(),
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_i64(),
            customer_id: order.customer_id.as_i64(),
            created_at: order.created_at,
            delivery_date: order.delivery_date,
            status: order.status,
            total_amount_cents: order.total_amount.cents(),
            notes: order.notes,
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// GET /api/Order: list orders matching the optional filters.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    observed(RESOURCE, "list", async move {
        let orders = state.orders.list(query.into()).await?;
        Ok(Json(orders.into_iter().map(Into::into).collect()))
    })
    .await
}

/// GET /api/Order/:id
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "get", async move {
        let order = state.orders.get(OrderId::new(id)).await?;
        Ok(Json(order.into()))
    })
    .await
}

/// POST /api/Order: place an order with its items.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<OrderRequest>,
) -> Result<Created<OrderResponse>, ApiError> {
    observed(RESOURCE, "create", async move {
        let order = req.into_order();
        order.validate()?;

        let order = state.orders.create(order).await?;
        Ok(created(format!("/api/Order/{}", order.id), order.into()))
    })
    .await
}

/// PUT /api/Order: overwrite the order whose id is in the body.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "update", save(state, req)).await
}

/// PUT /api/Order/:id: like `update`, but the body id must match the path.
#[tracing::instrument(skip(state, req))]
pub async fn update_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "update", async move {
        if req.id != id {
            return Err(ApiError::BadRequest(
                "The provided ID does not match the order ID.".to_string(),
            ));
        }
        save(state, req).await
    })
    .await
}

async fn save(state: Arc<AppState>, req: OrderRequest) -> Result<Json<OrderResponse>, ApiError> {
    let order = req.into_order();
    order.validate()?;

    let order = state.orders.update(order).await?;
    Ok(Json(order.into()))
}

/// DELETE /api/Order?id=: remove an order and its items.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "delete", remove(state, query.id_or_zero())).await
}

/// DELETE /api/Order/:id
#[tracing::instrument(skip(state))]
pub async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "delete", remove(state, id)).await
}

async fn remove(state: Arc<AppState>, id: i64) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.delete(OrderId::new(id)).await?;
    Ok(Json(order.into()))
}

/// POST /api/Order/:id/cancel: cancel an order that has not been delivered.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    observed(RESOURCE, "cancel", async move {
        let order = state.order_service.cancel(OrderId::new(id)).await?;
        Ok(Json(order.into()))
    })
    .await
}
