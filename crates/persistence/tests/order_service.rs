//! Order service tests over the in-memory backend.

use std::sync::Arc;

use domain::{
    Customer, CustomerId, CustomerRepository, Money, Order, OrderId, OrderItem, OrderRepository,
    OrderService, RepositoryError, status,
};
use persistence::InMemoryDatabase;

struct Fixture {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    service: OrderService,
}

fn fixture() -> Fixture {
    let db = InMemoryDatabase::new();
    let customers: Arc<dyn CustomerRepository> = Arc::new(db.customers());
    let orders: Arc<dyn OrderRepository> = Arc::new(db.orders());
    let service = OrderService::new(customers.clone(), orders.clone());
    Fixture {
        customers,
        orders,
        service,
    }
}

async fn place_order(f: &Fixture, customer_id: CustomerId) -> Order {
    f.orders
        .create(
            Order::new(customer_id)
                .with_item(OrderItem::new("Keyboard", 1, Money::from_cents(4999)))
                .with_total(Money::from_cents(4999)),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn draft_for_existing_customer() {
    let f = fixture();
    let customer = f
        .customers
        .create(Customer::new("Laura", "laura@mail.com"))
        .await
        .unwrap();

    let draft = f.service.draft_for(customer.id).await.unwrap();
    assert_eq!(draft.customer_id, customer.id);
    assert_eq!(draft.status, status::PENDING);
    assert!(!draft.id.is_valid());
    assert!(draft.items.is_empty());
}

#[tokio::test]
async fn draft_for_unknown_customer_is_not_found() {
    let f = fixture();
    let err = f.service.draft_for(CustomerId::new(9)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn orders_for_returns_only_that_customer() {
    let f = fixture();
    let a = f
        .customers
        .create(Customer::new("A", "a@mail.com"))
        .await
        .unwrap();
    let b = f
        .customers
        .create(Customer::new("B", "b@mail.com"))
        .await
        .unwrap();
    place_order(&f, a.id).await;
    place_order(&f, a.id).await;
    place_order(&f, b.id).await;

    let orders = f.service.orders_for(a.id).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.customer_id == a.id));

    let err = f.service.orders_for(CustomerId::new(42)).await.unwrap_err();
    assert_eq!(err.to_string(), "No customer found with ID 42.");
}

#[tokio::test]
async fn cancel_persists_new_status() {
    let f = fixture();
    let customer = f
        .customers
        .create(Customer::new("A", "a@mail.com"))
        .await
        .unwrap();
    let order = place_order(&f, customer.id).await;

    let cancelled = f.service.cancel(order.id).await.unwrap();
    assert!(cancelled.is_cancelled());

    let stored = f.orders.get(order.id).await.unwrap();
    assert_eq!(stored.status, status::CANCELLED);

    // Cancelling twice is a no-op
    let again = f.service.cancel(order.id).await.unwrap();
    assert_eq!(again.status, status::CANCELLED);
}

#[tokio::test]
async fn cancel_delivered_order_is_rejected() {
    let f = fixture();
    let customer = f
        .customers
        .create(Customer::new("A", "a@mail.com"))
        .await
        .unwrap();
    let mut order = place_order(&f, customer.id).await;
    order.status = status::DELIVERED.to_string();
    f.orders.update(order.clone()).await.unwrap();

    let err = f.service.cancel(order.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));

    let stored = f.orders.get(order.id).await.unwrap();
    assert_eq!(stored.status, status::DELIVERED);
}

#[tokio::test]
async fn cancel_unknown_order() {
    let f = fixture();
    assert!(f.service.cancel(OrderId::new(3)).await.unwrap_err().is_not_found());
    assert!(matches!(
        f.service.cancel(OrderId::new(0)).await,
        Err(RepositoryError::Invalid(_))
    ));
}
