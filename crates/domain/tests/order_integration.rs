//! Integration tests for the Order and Customer entities.
//!
//! These tests go through the public API only: building entities from JSON,
//! validating them and flattening the reports the way callers consume them.

use domain::{
    Customer, CustomerId, FieldError, Money, Order, OrderError, OrderItem, field_errors, status,
};
use validator::Validate;

fn report(errors: validator::ValidationErrors) -> Vec<(String, String)> {
    field_errors(&errors)
        .into_iter()
        .map(|FieldError { field, message }| (field, message))
        .collect()
}

mod customers {
    use super::*;

    #[test]
    fn customer_from_json_defaults_id_and_registration() {
        let customer: Customer =
            serde_json::from_str(r#"{"name":"Laura","email":"laura@mail.com"}"#).unwrap();

        assert_eq!(customer.id, CustomerId::unassigned());
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn every_broken_rule_is_reported() {
        let customer = Customer::new("x".repeat(101), "");

        let errors = report(customer.validate().unwrap_err());
        assert_eq!(
            errors,
            vec![
                ("email".to_string(), "Email is not a valid address.".to_string()),
                ("email".to_string(), "Email is required.".to_string()),
                (
                    "name".to_string(),
                    "Name cannot exceed 100 characters.".to_string()
                ),
            ]
        );
    }

    #[test]
    fn lengths_count_characters() {
        // 100 two-byte characters are within the limit
        let customer = Customer::new("é".repeat(100), "e@mail.com");
        assert!(customer.validate().is_ok());
    }
}

mod orders {
    use super::*;

    fn saved_customer() -> Customer {
        Customer::new("Juan", "juan@mail.com").with_id(CustomerId::new(4))
    }

    #[test]
    fn draft_for_saved_customer_becomes_valid_once_filled() {
        let draft = Order::for_customer(&saved_customer()).unwrap();
        assert!(draft.validate().is_err());

        let order = draft
            .with_item(OrderItem::new("Laptop", 2, Money::from_cents(75050)))
            .with_total(Money::from_cents(150100));
        assert!(order.validate().is_ok());
        assert_eq!(order.items_total(), order.total_amount);
        assert_eq!(order.items_total().to_string(), "$1501.00");
    }

    #[test]
    fn order_from_json_reports_nested_item_errors() {
        let order: Order = serde_json::from_str(
            r#"{
                "customer_id": 4,
                "total_amount": 500,
                "items": [
                    {"product_name": "Pen", "quantity": 5, "unit_price": 100},
                    {"product_name": " ", "quantity": 1, "unit_price": 100}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, status::PENDING);
        assert_eq!(
            report(order.validate().unwrap_err()),
            vec![(
                "items[1].product_name".to_string(),
                "Product name is required.".to_string()
            )]
        );
    }

    #[test]
    fn cancel_lifecycle() {
        let mut order = Order::for_customer(&saved_customer())
            .unwrap()
            .with_item(OrderItem::new("Pen", 1, Money::from_cents(100)))
            .with_total(Money::from_cents(100));

        order.cancel().unwrap();
        assert!(order.is_cancelled());
        assert!(order.validate().is_ok());

        order.status = status::DELIVERED.to_string();
        assert!(matches!(
            order.cancel(),
            Err(OrderError::CannotCancel { .. })
        ));
    }
}
