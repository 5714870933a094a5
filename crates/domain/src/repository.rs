//! Repository contracts and query filters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};

use crate::customer::Customer;
use crate::error::Result;
use crate::order::Order;

/// Optional filters for listing customers. Unset filters match everything.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Exact id; ignored unless strictly positive.
    pub id: Option<CustomerId>,

    /// Substring of the name (case-sensitive); ignored if blank.
    pub name: Option<String>,

    /// Substring of the email (case-sensitive); ignored if blank.
    pub email: Option<String>,
}

impl CustomerFilter {
    /// Creates a filter that matches every customer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: CustomerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The id filter, if it is usable.
    pub fn effective_id(&self) -> Option<CustomerId> {
        self.id.filter(CustomerId::is_valid)
    }

    /// The name filter, if it is non-blank.
    pub fn effective_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// The email filter, if it is non-blank.
    pub fn effective_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Returns true if the customer satisfies every active filter.
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(id) = self.effective_id()
            && customer.id != id
        {
            return false;
        }
        if let Some(name) = self.effective_name()
            && !customer.name.contains(name)
        {
            return false;
        }
        if let Some(email) = self.effective_email()
            && !customer.email.contains(email)
        {
            return false;
        }
        true
    }
}

/// Optional filters for listing orders. Unset filters match everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Orders placed by this customer.
    pub customer_id: Option<CustomerId>,

    /// Delivery date lower bound (inclusive).
    pub date_from: Option<DateTime<Utc>>,

    /// Delivery date upper bound (inclusive).
    pub date_to: Option<DateTime<Utc>>,

    /// Exact status; ignored if blank.
    pub status: Option<String>,
}

impl OrderFilter {
    /// Creates a filter that matches every order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn date_from(mut self, from: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self
    }

    pub fn date_to(mut self, to: DateTime<Utc>) -> Self {
        self.date_to = Some(to);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The status filter, if it is non-blank.
    pub fn effective_status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    /// Returns true if the order satisfies every active filter.
    ///
    /// Date bounds apply to the delivery date, so an order without one never
    /// matches a date bound.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = self.customer_id
            && order.customer_id != customer_id
        {
            return false;
        }
        if let Some(from) = self.date_from
            && !order.delivery_date.is_some_and(|d| d >= from)
        {
            return false;
        }
        if let Some(to) = self.date_to
            && !order.delivery_date.is_some_and(|d| d <= to)
        {
            return false;
        }
        if let Some(status) = self.effective_status()
            && order.status != status
        {
            return false;
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Persistence contract for customers.
///
/// Every operation returns either its value or a `RepositoryError` carrying a
/// human-readable message. Implementations must be thread-safe.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Lists customers matching the filter, ordered by id.
    async fn list(&self, filter: CustomerFilter) -> Result<Vec<Customer>>;

    /// Loads a customer.
    ///
    /// Fails with `Invalid` for ids <= 0 without touching storage, and with
    /// `NotFound` if no row exists.
    async fn get(&self, id: CustomerId) -> Result<Customer>;

    /// Stores a new customer and returns it with its assigned id.
    ///
    /// Fails with `Invalid` if the name is blank.
    async fn create(&self, customer: Customer) -> Result<Customer>;

    /// Overwrites every field of an existing customer.
    ///
    /// Fails with `Invalid` for ids <= 0 or a blank name, and with `NotFound`
    /// if the customer does not exist.
    async fn update(&self, customer: Customer) -> Result<Customer>;

    /// Removes a customer and returns the removed row.
    async fn delete(&self, id: CustomerId) -> Result<Customer>;

    /// Returns true if a customer with this id exists.
    async fn exists(&self, id: CustomerId) -> Result<bool>;

    /// Number of stored customers.
    async fn count(&self) -> Result<usize>;
}

/// Persistence contract for orders and their items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Lists orders matching the filter with their items, ordered by id.
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Loads an order with its items.
    async fn get(&self, id: OrderId) -> Result<Order>;

    /// Stores a new order and its items atomically.
    ///
    /// Fails with `Invalid` if the order has no items and with `NotFound` if
    /// the referenced customer does not exist.
    async fn create(&self, order: Order) -> Result<Order>;

    /// Overwrites every field of an existing order and replaces its items.
    ///
    /// Fails with `Invalid` for ids <= 0 and with `NotFound` if either the
    /// referenced customer or the order does not exist.
    async fn update(&self, order: Order) -> Result<Order>;

    /// Removes an order with its items and returns the removed row.
    async fn delete(&self, id: OrderId) -> Result<Order>;

    /// Number of stored orders.
    async fn count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::order::OrderItem;
    use crate::value_objects::Money;

    fn customer(id: i64, name: &str, email: &str) -> Customer {
        Customer::new(name, email).with_id(CustomerId::new(id))
    }

    fn order_delivered_on(day: u32) -> Order {
        let mut order = Order::new(CustomerId::new(1))
            .with_item(OrderItem::new("Laptop", 1, Money::from_cents(1000)))
            .with_total(Money::from_cents(1000));
        order.delivery_date = Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap());
        order
    }

    #[test]
    fn empty_customer_filter_matches_everything() {
        let filter = CustomerFilter::new();
        assert!(filter.matches(&customer(1, "Juan", "juan@mail.com")));
    }

    #[test]
    fn non_positive_id_filter_is_ignored() {
        let filter = CustomerFilter::new().id(CustomerId::new(0));
        assert!(filter.effective_id().is_none());
        assert!(filter.matches(&customer(8, "Juan", "juan@mail.com")));
    }

    #[test]
    fn name_filter_is_a_case_sensitive_substring() {
        let filter = CustomerFilter::new().name("ari");
        assert!(filter.matches(&customer(1, "Maria", "maria@mail.com")));
        assert!(!filter.matches(&customer(2, "ARIEL", "ariel@mail.com")));
    }

    #[test]
    fn blank_text_filters_are_ignored() {
        let filter = CustomerFilter::new().name("  ").email("");
        assert!(filter.effective_name().is_none());
        assert!(filter.effective_email().is_none());
        assert!(filter.matches(&customer(1, "Juan", "juan@mail.com")));
    }

    #[test]
    fn customer_filters_combine() {
        let filter = CustomerFilter::new().name("Juan").email("work");
        assert!(filter.matches(&customer(1, "Juan", "juan@work.com")));
        assert!(!filter.matches(&customer(2, "Juan", "juan@home.com")));
    }

    #[test]
    fn date_bounds_are_inclusive_on_delivery_date() {
        let from = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let filter = OrderFilter::new().date_from(from).date_to(to);

        assert!(filter.matches(&order_delivered_on(10)));
        assert!(filter.matches(&order_delivered_on(20)));
        assert!(!filter.matches(&order_delivered_on(9)));
        assert!(!filter.matches(&order_delivered_on(21)));
    }

    #[test]
    fn undelivered_orders_never_match_a_date_bound() {
        let mut order = order_delivered_on(15);
        order.delivery_date = None;

        let from = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert!(!OrderFilter::new().date_from(from).matches(&order));
        assert!(OrderFilter::new().matches(&order));
    }

    #[test]
    fn status_filter_is_exact() {
        let order = order_delivered_on(15);
        assert!(OrderFilter::new().status("Pending").matches(&order));
        assert!(!OrderFilter::new().status("Pend").matches(&order));
        assert!(OrderFilter::new().status(" ").matches(&order));
    }

    #[test]
    fn customer_filter_on_orders() {
        let order = order_delivered_on(15);
        assert!(OrderFilter::new().customer_id(CustomerId::new(1)).matches(&order));
        assert!(!OrderFilter::new().customer_id(CustomerId::new(2)).matches(&order));
    }
}
