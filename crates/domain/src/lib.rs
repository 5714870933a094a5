//! Domain layer for the customer and order service.
//!
//! This crate provides:
//! - The `Customer`, `Order` and `OrderItem` entities with their validation rules
//! - The `CustomerRepository` and `OrderRepository` contracts and their filters
//! - `OrderService` for operations spanning both repositories

pub mod customer;
pub mod error;
pub mod order;
pub mod repository;
pub mod validation;
pub mod value_objects;

pub use common::{CustomerId, OrderId, OrderItemId};
pub use customer::Customer;
pub use error::{RepositoryError, Result};
pub use order::{Order, OrderError, OrderItem, OrderService, status};
pub use repository::{CustomerFilter, CustomerRepository, OrderFilter, OrderRepository};
pub use validation::{FieldError, field_errors};
pub use value_objects::Money;
