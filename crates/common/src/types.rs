use serde::{Deserialize, Serialize};

/// Declares an integer primary-key newtype.
///
/// Keys are assigned by the store on insert. A value of zero means the
/// entity has not been persisted yet; negative values are never valid.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw key.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// The key of an entity that has not been stored yet.
            pub fn unassigned() -> Self {
                Self(0)
            }

            /// Returns the raw key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// Returns true if the key can refer to a stored row (strictly positive).
            pub fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Primary key of a customer.
    CustomerId
);

entity_id!(
    /// Primary key of an order.
    OrderId
);

entity_id!(
    /// Primary key of a single order line.
    OrderItemId
);
