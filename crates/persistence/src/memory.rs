use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId};
use domain::{
    Customer, CustomerFilter, CustomerRepository, Order, OrderFilter, OrderRepository, Result,
};
use tokio::sync::RwLock;

use crate::error::{
    customer_has_orders, customer_id_invalid, customer_name_required, customer_not_found,
    id_not_positive, order_invalid, order_not_found, order_without_items,
};

#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    orders: BTreeMap<OrderId, Order>,
    last_customer_id: i64,
    last_order_id: i64,
    last_item_id: i64,
}

impl Tables {
    fn next_customer_id(&mut self) -> CustomerId {
        self.last_customer_id += 1;
        CustomerId::new(self.last_customer_id)
    }

    fn next_order_id(&mut self) -> OrderId {
        self.last_order_id += 1;
        OrderId::new(self.last_order_id)
    }

    /// Gives every line of the order a fresh key and points it at the order.
    fn assign_item_ids(&mut self, order: &mut Order) {
        for item in &mut order.items {
            self.last_item_id += 1;
            item.id = OrderItemId::new(self.last_item_id);
            item.order_id = order.id;
        }
    }
}

/// In-memory database shared by the in-memory repositories.
///
/// Both repositories obtained from the same database see each other's rows,
/// so order operations can check the referenced customer and customer
/// deletion can check for dependent orders. Keys are assigned from
/// per-table sequences starting at 1, like the PostgreSQL backend.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a customer repository backed by this database.
    pub fn customers(&self) -> InMemoryCustomerRepository {
        InMemoryCustomerRepository { db: self.clone() }
    }

    /// Returns an order repository backed by this database.
    pub fn orders(&self) -> InMemoryOrderRepository {
        InMemoryOrderRepository { db: self.clone() }
    }
}

/// Customer repository over an `InMemoryDatabase`.
#[derive(Clone, Default)]
pub struct InMemoryCustomerRepository {
    db: InMemoryDatabase,
}

impl InMemoryCustomerRepository {
    /// Creates a repository over a fresh, private database.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn list(&self, filter: CustomerFilter) -> Result<Vec<Customer>> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get(&self, id: CustomerId) -> Result<Customer> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let tables = self.db.tables.read().await;
        tables
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| customer_not_found(id))
    }

    async fn create(&self, mut customer: Customer) -> Result<Customer> {
        if !customer.has_name() {
            return Err(customer_name_required());
        }

        let mut tables = self.db.tables.write().await;
        customer.id = tables.next_customer_id();
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: Customer) -> Result<Customer> {
        if !customer.id.is_valid() {
            return Err(customer_id_invalid());
        }
        if !customer.has_name() {
            return Err(customer_name_required());
        }

        let mut tables = self.db.tables.write().await;
        let existing = tables
            .customers
            .get_mut(&customer.id)
            .ok_or_else(|| customer_not_found(customer.id))?;
        *existing = customer.clone();
        Ok(customer)
    }

    async fn delete(&self, id: CustomerId) -> Result<Customer> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let mut tables = self.db.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Err(customer_not_found(id));
        }
        if tables.orders.values().any(|o| o.customer_id == id) {
            return Err(customer_has_orders(id));
        }
        tables
            .customers
            .remove(&id)
            .ok_or_else(|| customer_not_found(id))
    }

    async fn exists(&self, id: CustomerId) -> Result<bool> {
        Ok(self.db.tables.read().await.customers.contains_key(&id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.db.tables.read().await.customers.len())
    }
}

/// Order repository over an `InMemoryDatabase`.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    db: InMemoryDatabase,
}

impl InMemoryOrderRepository {
    /// Creates a repository over a fresh, private database.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }

    async fn get(&self, id: OrderId) -> Result<Order> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let tables = self.db.tables.read().await;
        tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| order_not_found(id))
    }

    async fn create(&self, mut order: Order) -> Result<Order> {
        if order.items.is_empty() {
            return Err(order_without_items());
        }

        let mut tables = self.db.tables.write().await;
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(customer_not_found(order.customer_id));
        }

        order.id = tables.next_order_id();
        tables.assign_item_ids(&mut order);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        if !order.id.is_valid() {
            return Err(order_invalid());
        }

        let mut tables = self.db.tables.write().await;
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(customer_not_found(order.customer_id));
        }
        if !tables.orders.contains_key(&order.id) {
            return Err(order_not_found(order.id));
        }

        tables.assign_item_ids(&mut order);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete(&self, id: OrderId) -> Result<Order> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let mut tables = self.db.tables.write().await;
        tables.orders.remove(&id).ok_or_else(|| order_not_found(id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.db.tables.read().await.orders.len())
    }
}
