//! Shared application state.

use std::sync::Arc;

use domain::{CustomerRepository, OrderRepository, OrderService};
use persistence::{InMemoryDatabase, PgPool, PostgresCustomerRepository, PostgresOrderRepository};

/// Shared application state accessible from all handlers.
///
/// Handlers only see the repository traits, so the same router serves the
/// in-memory and the PostgreSQL backend.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub order_service: OrderService,
}

impl AppState {
    pub fn new(customers: Arc<dyn CustomerRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        let order_service = OrderService::new(customers.clone(), orders.clone());
        Self {
            customers,
            orders,
            order_service,
        }
    }

    /// State over a fresh in-memory database.
    pub fn in_memory() -> Self {
        let db = InMemoryDatabase::new();
        Self::new(Arc::new(db.customers()), Arc::new(db.orders()))
    }

    /// State over a PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PostgresCustomerRepository::new(pool.clone())),
            Arc::new(PostgresOrderRepository::new(pool)),
        )
    }
}
