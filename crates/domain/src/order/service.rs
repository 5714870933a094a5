//! Order service for operations that span both repositories.

use std::sync::Arc;

use common::{CustomerId, OrderId};

use crate::error::{RepositoryError, Result};
use crate::repository::{CustomerRepository, OrderFilter, OrderRepository};

use super::{Order, OrderError};

impl From<OrderError> for RepositoryError {
    fn from(e: OrderError) -> Self {
        RepositoryError::Invalid(e.to_string())
    }
}

/// Service for managing orders on behalf of customers.
///
/// Wraps the two repositories and provides the operations that need both of
/// them, or that load, change and save an order in one step.
#[derive(Clone)]
pub struct OrderService {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    /// Creates a new order service over the given repositories.
    pub fn new(customers: Arc<dyn CustomerRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { customers, orders }
    }

    /// Starts an empty, unsaved order for an existing customer.
    #[tracing::instrument(skip(self))]
    pub async fn draft_for(&self, customer_id: CustomerId) -> Result<Order> {
        let customer = self.customers.get(customer_id).await?;
        Ok(Order::for_customer(&customer)?)
    }

    /// Lists the orders of an existing customer.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        // Surfaces NotFound for unknown customers instead of an empty list.
        self.customers.get(customer_id).await?;
        self.orders
            .list(OrderFilter::new().customer_id(customer_id))
            .await
    }

    /// Cancels an order and persists the new status.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let mut order = self.orders.get(order_id).await?;
        if order.is_cancelled() {
            return Ok(order);
        }

        order.cancel()?;
        let order = self.orders.update(order).await?;
        tracing::info!(%order_id, "order cancelled");
        Ok(order)
    }
}
