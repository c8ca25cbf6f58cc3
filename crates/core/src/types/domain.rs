//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `a-z`, `0-9`, `-`, `.`.
    #[error("shop domain contains invalid character `{0}`")]
    InvalidCharacter(char),
    /// The input has no dot separator.
    #[error("shop domain must contain a dot")]
    MissingDot,
}

/// A shop domain, e.g. `volo-living.myshopify.com`.
///
/// Shop domains identify tenants, so the representation is kept canonical:
/// lowercase ascii letters, digits, dashes and dots only. Tenant resolution
/// is an exact match on this canonical form - an inbound header that fails
/// to parse can never match a configured tenant.
///
/// ## Examples
///
/// ```
/// use volo_sync_core::ShopDomain;
///
/// assert!(ShopDomain::parse("volo-living.myshopify.com").is_ok());
///
/// assert!(ShopDomain::parse("").is_err());             // empty
/// assert!(ShopDomain::parse("Volo.Myshopify.Com").is_err()); // not canonical
/// assert!(ShopDomain::parse("localhost").is_err());    // no dot
/// assert!(ShopDomain::parse("shop.example.com/admin").is_err()); // path
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a domain name (RFC 1035).
    pub const MAX_LENGTH: usize = 253;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 253 characters
    /// - Contains anything other than lowercase ascii letters, digits,
    ///   dashes and dots
    /// - Has no dot separator
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(bad));
        }

        if !s.contains('.') {
            return Err(ShopDomainError::MissingDot);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShopDomain` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let domain = ShopDomain::parse("volo-living.myshopify.com").expect("valid domain");
        assert_eq!(domain.as_str(), "volo-living.myshopify.com");
        assert_eq!(domain.to_string(), "volo-living.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ShopDomain::parse(""), Err(ShopDomainError::Empty)));
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert!(matches!(
            ShopDomain::parse("Volo.myshopify.com"),
            Err(ShopDomainError::InvalidCharacter('V'))
        ));
    }

    #[test]
    fn test_parse_rejects_scheme_and_path() {
        assert!(ShopDomain::parse("https://volo.myshopify.com").is_err());
        assert!(ShopDomain::parse("volo.myshopify.com/admin").is_err());
    }

    #[test]
    fn test_parse_requires_dot() {
        assert!(matches!(
            ShopDomain::parse("localhost"),
            Err(ShopDomainError::MissingDot)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}.com", "a".repeat(260));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_equality_is_exact() {
        let a = ShopDomain::parse("shop-a.myshopify.com").expect("valid");
        let b = ShopDomain::parse("shop-b.myshopify.com").expect("valid");
        assert_ne!(a, b);
    }
}
