//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{FieldError, RepositoryError, field_errors};
use validator::ValidationErrors;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// The request body broke one or more field rules.
    #[error("One or more validation errors occurred.")]
    Validation(Vec<FieldError>),
    /// Repository failure, mapped by kind.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Repository(RepositoryError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Repository(RepositoryError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
        }

        let body = match self {
            ApiError::Validation(details) => serde_json::json!({
                "error": "One or more validation errors occurred.",
                "details": details,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(
            field_errors(&errors)
                .into_iter()
                .map(|e| FieldError {
                    field: json_field_path(&e.field),
                    message: e.message,
                })
                .collect(),
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Rewrites an entity field path (`items[0].unit_price`) into the key path
/// clients send (`items[0].unitPriceCents`).
fn json_field_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let (name, index) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };
            let mut key = camel_case(name);
            if matches!(key.as_str(), "totalAmount" | "unitPrice" | "subtotal") {
                key.push_str("Cents");
            }
            key + index
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_by_repository_kind() {
        assert_eq!(
            ApiError::from(RepositoryError::invalid("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RepositoryError::not_found("gone")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RepositoryError::store("Error saving customer: boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_message_passes_through() {
        let err = ApiError::from(RepositoryError::not_found("No order found with ID 7."));
        assert_eq!(err.to_string(), "No order found with ID 7.");
    }

    #[test]
    fn test_json_field_path() {
        assert_eq!(json_field_path("name"), "name");
        assert_eq!(json_field_path("customer_id"), "customerId");
        assert_eq!(json_field_path("total_amount"), "totalAmountCents");
        assert_eq!(
            json_field_path("items[2].unit_price"),
            "items[2].unitPriceCents"
        );
        assert_eq!(
            json_field_path("items[1].subtotal"),
            "items[1].subtotalCents"
        );
        assert_eq!(
            json_field_path("items[0].product_name"),
            "items[0].productName"
        );
    }
}
