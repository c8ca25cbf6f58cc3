//! Tenant identities and the tenant resolver.
//!
//! A tenant is one Shopify store with its own webhook signing secret and
//! Admin API access token. The table is built once at startup from
//! configuration and never changes afterwards; resolution is an exact
//! match on the canonical shop domain. Unknown domains resolve to nothing -
//! there is no default tenant and no fallback secret.

use std::collections::HashMap;

use secrecy::SecretString;
use volo_sync_core::ShopDomain;

/// One Shopify store and its credentials.
///
/// Implements `Debug` manually to redact the signing secret and access token.
#[derive(Clone)]
pub struct Tenant {
    /// Canonical shop domain (e.g. `volo-living.myshopify.com`)
    pub domain: ShopDomain,
    /// Webhook signing secret (HMAC key)
    pub api_secret: SecretString,
    /// Admin API access token
    pub access_token: SecretString,
    /// Whether the related-products sync runs for this shop
    pub related_products_enabled: bool,
}

impl std::fmt::Debug for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenant")
            .field("domain", &self.domain)
            .field("api_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("related_products_enabled", &self.related_products_enabled)
            .finish()
    }
}

/// Immutable shop-domain to tenant mapping.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    tenants: HashMap<ShopDomain, Tenant>,
}

impl TenantRegistry {
    /// Build a registry from the configured tenant list.
    #[must_use]
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self {
            tenants: tenants
                .into_iter()
                .map(|t| (t.domain.clone(), t))
                .collect(),
        }
    }

    /// Resolve a shop domain to its tenant, by exact match.
    #[must_use]
    pub fn resolve(&self, domain: &ShopDomain) -> Option<&Tenant> {
        self.tenants.get(domain)
    }

    /// Iterate over all configured tenants.
    pub fn iter(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.values()
    }

    /// Number of configured tenants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
