//! Newtype IDs for type-safe Shopify resource references.
//!
//! Shopify addresses resources two ways: a bare numeric id (what webhook
//! payloads and metafield values carry) and a global id of the form
//! `gid://shopify/<Resource>/<n>` (what the GraphQL Admin API expects).
//! The `define_resource_id!` macro creates newtypes that hold the numeric
//! form and convert between the two.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a resource id.
#[derive(thiserror::Error, Debug, Clone)]
pub enum IdParseError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input is neither a numeric id nor a gid of the expected resource.
    #[error("`{input}` is not a numeric id or a {resource} gid")]
    Invalid {
        /// The expected gid resource name (e.g. `Product`).
        resource: &'static str,
        /// The rejected input.
        input: String,
    },
}

/// Macro to define a type-safe Shopify resource id.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `new()` / `as_u64()` conversions
/// - `gid()` rendering to `gid://shopify/<Resource>/<n>`
/// - `parse()` accepting either a numeric string or a full gid
///
/// # Example
///
/// ```rust
/// # use volo_sync_core::define_resource_id;
/// define_resource_id!(PageId, "Page");
///
/// let id = PageId::new(42);
/// assert_eq!(id.gid(), "gid://shopify/Page/42");
/// assert_eq!(PageId::parse("gid://shopify/Page/42").unwrap(), id);
/// assert_eq!(PageId::parse("42").unwrap(), id);
/// ```
#[macro_export]
macro_rules! define_resource_id {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The gid resource name for this id type.
            pub const RESOURCE: &'static str = $resource;

            /// Create a new id from a numeric value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying numeric value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Render the id as a Shopify global id.
            #[must_use]
            pub fn gid(&self) -> ::std::string::String {
                ::std::format!("gid://shopify/{}/{}", $resource, self.0)
            }

            /// Parse an id from either a numeric string or a full gid.
            ///
            /// Leading and trailing whitespace is ignored.
            ///
            /// # Errors
            ///
            /// Returns [`IdParseError`] if the input is empty or is neither a
            /// numeric id nor a gid of this resource type.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::types::id::IdParseError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdParseError::Empty);
                }
                let numeric = trimmed
                    .strip_prefix(concat!("gid://shopify/", $resource, "/"))
                    .unwrap_or(trimmed);
                numeric
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| $crate::types::id::IdParseError::Invalid {
                        resource: $resource,
                        input: raw.to_owned(),
                    })
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_resource_id!(ProductId, "Product");
define_resource_id!(VariantId, "ProductVariant");
define_resource_id!(CollectionId, "Collection");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_rendering() {
        assert_eq!(
            ProductId::new(632_910_392).gid(),
            "gid://shopify/Product/632910392"
        );
        assert_eq!(
            VariantId::new(7).gid(),
            "gid://shopify/ProductVariant/7"
        );
    }

    #[test]
    fn test_parse_numeric() {
        let id = ProductId::parse("123").expect("numeric id");
        assert_eq!(id.as_u64(), 123);
    }

    #[test]
    fn test_parse_gid() {
        let id = VariantId::parse("gid://shopify/ProductVariant/456").expect("gid");
        assert_eq!(id, VariantId::new(456));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = VariantId::parse("  789 ").expect("padded id");
        assert_eq!(id.as_u64(), 789);
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ProductId::parse("  "), Err(IdParseError::Empty)));
    }

    #[test]
    fn test_parse_wrong_resource_gid() {
        // A Product gid is not a valid variant id
        let result = VariantId::parse("gid://shopify/Product/123");
        assert!(matches!(result, Err(IdParseError::Invalid { .. })));
    }

    #[test]
    fn test_parse_garbage() {
        let result = ProductId::parse("not-an-id");
        assert!(matches!(result, Err(IdParseError::Invalid { .. })));
    }

    #[test]
    fn test_display_is_numeric() {
        assert_eq!(ProductId::new(42).to_string(), "42");
    }
}
