//! Shared types for the customer and order service.

pub mod types;

pub use types::{CustomerId, OrderId, OrderItemId};
