//! Order and order line entities.

mod item;
mod service;

pub use item::OrderItem;
pub use service::OrderService;

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::customer::Customer;
use crate::validation::{assigned_customer, not_blank, positive_amount};
use crate::value_objects::Money;

/// Well-known order statuses. Status is free text; these are the values the
/// service itself assigns or checks.
pub mod status {
    pub const PENDING: &str = "Pending";
    pub const DELIVERED: &str = "Delivered";
    pub const CANCELLED: &str = "Cancelled";
}

/// Errors raised by order operations that are not plain field validation.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The customer has not been stored yet.
    #[error("Customer must be saved before placing an order")]
    CustomerNotPersisted,

    /// The order is in a status that cannot be cancelled.
    #[error("Order {order_id} cannot be cancelled from status {status}")]
    CannotCancel { order_id: OrderId, status: String },
}

/// An order placed by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "items_total_in_range"))]
pub struct Order {
    #[serde(default)]
    pub id: OrderId,

    #[validate(custom(function = "assigned_customer", message = "Customer ID is required."))]
    pub customer_id: CustomerId,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,

    #[validate(
        custom(function = "not_blank", message = "Status is required."),
        length(max = 50, message = "Status cannot exceed 50 characters.")
    )]
    #[serde(default = "default_status")]
    pub status: String,

    #[validate(custom(
        function = "positive_amount",
        message = "Total amount must be greater than zero."
    ))]
    pub total_amount: Money,

    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters."))]
    #[serde(default)]
    pub notes: Option<String>,

    #[validate(
        length(min = 1, message = "Order must contain at least one item."),
        nested
    )]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Only runs once every field is valid; reported under `items`.
fn items_total_in_range(order: &Order) -> Result<(), ValidationError> {
    if order.checked_items_total().is_none() {
        return Err(ValidationError::new("items")
            .with_message("Items total exceeds the largest supported amount.".into()));
    }
    Ok(())
}

fn default_status() -> String {
    status::PENDING.to_string()
}

impl Order {
    /// Creates an unsaved, empty `Pending` order for a customer.
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            id: OrderId::unassigned(),
            customer_id,
            created_at: Utc::now(),
            delivery_date: None,
            status: default_status(),
            total_amount: Money::zero(),
            notes: None,
            items: Vec::new(),
        }
    }

    /// Creates an unsaved, empty `Pending` order for a stored customer.
    pub fn for_customer(customer: &Customer) -> Result<Self, OrderError> {
        if !customer.id.is_valid() {
            return Err(OrderError::CustomerNotPersisted);
        }
        Ok(Self::new(customer.id))
    }

    /// Appends a line and returns the order.
    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Sets the total amount and returns the order.
    pub fn with_total(mut self, total: Money) -> Self {
        self.total_amount = total;
        self
    }

    /// Sum of the line subtotals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// Sum of the line subtotals, or `None` if it does not fit in `Money`.
    pub fn checked_items_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |total, item| {
            total.checked_add(item.checked_subtotal()?)
        })
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == status::CANCELLED
    }

    /// Marks the order as cancelled.
    ///
    /// Cancelling an already cancelled order is a no-op; delivered orders
    /// cannot be cancelled.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status == status::DELIVERED {
            return Err(OrderError::CannotCancel {
                order_id: self.id,
                status: self.status.clone(),
            });
        }
        self.status = status::CANCELLED.to_string();
        Ok(())
    }
}
