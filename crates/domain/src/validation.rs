//! Custom field validators and flattening of `validator` reports.

use std::borrow::Cow;

use common::CustomerId;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::value_objects::Money;

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed("Value is required.")),
        );
    }
    Ok(())
}

/// Rejects zero and negative amounts.
pub fn positive_amount(value: &Money) -> Result<(), ValidationError> {
    if !value.is_positive() {
        return Err(ValidationError::new("range")
            .with_message(Cow::Borrowed("Amount must be greater than zero.")));
    }
    Ok(())
}

/// Rejects customer references that cannot point at a stored row.
pub fn assigned_customer(value: &CustomerId) -> Result<(), ValidationError> {
    if !value.is_valid() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Customer ID is required.")));
    }
    Ok(())
}

/// A single violated rule, addressed by field path (`items[0].quantity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Flattens a nested validation report into a sorted list of field errors.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    out
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join(prefix, field);

        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|err| FieldError {
                    // Struct-level rules land under `__all__`; their code names the field
                    field: if field.as_ref() == "__all__" {
                        join(prefix, &err.code)
                    } else {
                        path.clone()
                    },
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank(" Ana ").is_ok());
    }

    #[test]
    fn positive_amount_rejects_zero() {
        assert!(positive_amount(&Money::zero()).is_err());
        assert!(positive_amount(&Money::from_cents(-5)).is_err());
        assert!(positive_amount(&Money::from_cents(1)).is_ok());
    }

    #[test]
    fn assigned_customer_requires_positive_id() {
        assert!(assigned_customer(&CustomerId::unassigned()).is_err());
        assert!(assigned_customer(&CustomerId::new(3)).is_ok());
    }
}
