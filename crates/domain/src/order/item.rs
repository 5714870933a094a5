use common::{OrderId, OrderItemId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::validation::{not_blank, positive_amount};
use crate::value_objects::Money;

/// A single line of an order.
///
/// The subtotal is always derived from quantity and unit price; it is never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "subtotal_in_range"))]
pub struct OrderItem {
    #[serde(default)]
    pub id: OrderItemId,

    /// Owning order, set by the store when the order is saved.
    #[serde(default)]
    pub order_id: OrderId,

    #[validate(
        custom(function = "not_blank", message = "Product name is required."),
        length(max = 100, message = "Product name cannot exceed 100 characters.")
    )]
    pub product_name: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,

    #[validate(custom(
        function = "positive_amount",
        message = "Unit price must be greater than zero."
    ))]
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates an unsaved line.
    pub fn new(product_name: impl Into<String>, quantity: i32, unit_price: Money) -> Self {
        Self {
            id: OrderItemId::unassigned(),
            order_id: OrderId::unassigned(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns quantity * unit_price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Returns quantity * unit_price, or `None` if it does not fit in `Money`.
    pub fn checked_subtotal(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

/// Rejects lines whose subtotal cannot be represented. Reported under the
/// `subtotal` field.
fn subtotal_in_range(item: &OrderItem) -> Result<(), ValidationError> {
    if item.checked_subtotal().is_none() {
        return Err(ValidationError::new("subtotal")
            .with_message("Subtotal exceeds the largest supported amount.".into()));
    }
    Ok(())
}
