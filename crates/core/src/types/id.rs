//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Platform entity ids
//! are opaque strings; variant ids are small integers scoped to a product.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper around an opaque string.
///
/// Creates a newtype wrapper with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` / `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use sunrise_core::define_id;
/// define_id!(CustomerId);
/// define_id!(StoreId);
///
/// let customer = CustomerId::new("a7f3");
/// let store = StoreId::new("a7f3");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = store;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(ShoppingListId);
define_id!(LineItemId);
define_id!(CustomerGroupId);
define_id!(ChannelId);

impl LineItemId {
    /// Sentinel id for a line item created locally and not yet confirmed by
    /// the platform. Replaced by the server-assigned id on reconciliation.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self(String::new())
    }

    /// Whether this id is the local placeholder sentinel.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.is_empty()
    }
}

/// A product variant id, unique within its product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VariantId(i32);

impl VariantId {
    /// Create a new variant ID from an i32 value.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl ::core::fmt::Display for VariantId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for VariantId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<VariantId> for i32 {
    fn from(id: VariantId) -> Self {
        id.0
    }
}
