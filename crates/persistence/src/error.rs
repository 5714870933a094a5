//! Failure messages shared by every backend, and mapping of sqlx errors.

use common::{CustomerId, OrderId};
use domain::RepositoryError;

pub(crate) fn id_not_positive() -> RepositoryError {
    RepositoryError::invalid("ID must be greater than zero.")
}

pub(crate) fn customer_not_found(id: CustomerId) -> RepositoryError {
    RepositoryError::not_found(format!("No customer found with ID {id}."))
}

pub(crate) fn order_not_found(id: OrderId) -> RepositoryError {
    RepositoryError::not_found(format!("No order found with ID {id}."))
}

pub(crate) fn customer_name_required() -> RepositoryError {
    RepositoryError::invalid("Customer name is required.")
}

pub(crate) fn customer_id_invalid() -> RepositoryError {
    RepositoryError::invalid("Customer ID must be valid.")
}

pub(crate) fn customer_has_orders(id: CustomerId) -> RepositoryError {
    RepositoryError::invalid(format!(
        "Customer {id} still has orders and cannot be deleted."
    ))
}

pub(crate) fn order_without_items() -> RepositoryError {
    RepositoryError::invalid("Order must contain at least one item.")
}

pub(crate) fn order_invalid() -> RepositoryError {
    RepositoryError::invalid("Order is invalid.")
}

/// Returns a mapper turning a sqlx failure during `action` into a
/// `RepositoryError` whose message carries the database's own text.
///
/// Constraint violations (foreign key, check) are the caller's fault and map
/// to `Invalid`; everything else maps to `Store`.
pub(crate) fn store_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| {
        let message = format!("Error {action}: {err}");
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_foreign_key_violation() || db_err.is_check_violation())
        {
            return RepositoryError::Invalid(message);
        }
        tracing::error!(error = %err, action, "database operation failed");
        RepositoryError::Store(message)
    }
}
