//! Repository implementations for the customer and order service.
//!
//! - `InMemoryDatabase` keeps every table in process memory; used for tests
//!   and when no database is configured.
//! - `PostgresCustomerRepository` / `PostgresOrderRepository` talk to
//!   PostgreSQL through a shared `sqlx::PgPool`.

pub mod error;
pub mod memory;
pub mod postgres;

pub use domain::{CustomerRepository, OrderRepository, RepositoryError, Result};
pub use memory::{InMemoryCustomerRepository, InMemoryDatabase, InMemoryOrderRepository};
pub use postgres::{PostgresCustomerRepository, PostgresOrderRepository, connect, run_migrations};
pub use sqlx::PgPool;
