//! Customer entity.

use chrono::{DateTime, Utc};
use common::CustomerId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::not_blank;

/// A registered customer.
///
/// Orders reference customers by `id`; a customer cannot be removed while
/// orders still point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Customer {
    /// Store-assigned key, zero until persisted.
    #[serde(default)]
    pub id: CustomerId,

    #[validate(
        custom(function = "not_blank", message = "Name is required."),
        length(max = 100, message = "Name cannot exceed 100 characters.")
    )]
    pub name: String,

    #[validate(
        custom(function = "not_blank", message = "Email is required."),
        email(message = "Email is not a valid address."),
        length(max = 150, message = "Email cannot exceed 150 characters.")
    )]
    pub email: String,

    /// When the customer registered.
    #[serde(default = "Utc::now")]
    pub registered_at: DateTime<Utc>,
}

impl Customer {
    /// Creates an unsaved customer registered now.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: CustomerId::unassigned(),
            name: name.into(),
            email: email.into(),
            registered_at: Utc::now(),
        }
    }

    /// Sets the key, typically to address an existing row in an update.
    pub fn with_id(mut self, id: CustomerId) -> Self {
        self.id = id;
        self
    }

    /// Returns true if the name has non-whitespace content.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
