//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use volo_sync_core::ShopDomain;

use crate::config::AppConfig;
use crate::shopify::SyncClient;
use crate::tenants::{Tenant, TenantRegistry};

/// Application state shared across all handlers.
///
/// Read-only after startup: the tenant registry and the per-tenant API
/// clients are built once and never mutated.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    registry: TenantRegistry,
    clients: HashMap<ShopDomain, SyncClient>,
}

impl AppState {
    /// Build the state from loaded configuration.
    ///
    /// One [`SyncClient`] is created per tenant; they share a single
    /// `reqwest::Client` connection pool.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();

        let clients = config
            .tenants
            .iter()
            .map(|tenant| {
                (
                    tenant.domain.clone(),
                    SyncClient::new(http.clone(), tenant, &config.api_version),
                )
            })
            .collect();

        let registry = TenantRegistry::new(config.tenants.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                registry,
                clients,
            }),
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Resolve a shop domain to its tenant and API client, by exact match.
    #[must_use]
    pub fn resolve(&self, domain: &ShopDomain) -> Option<(&Tenant, &SyncClient)> {
        let tenant = self.inner.registry.resolve(domain)?;
        let client = self.inner.clients.get(domain)?;
        Some((tenant, client))
    }

    /// Iterate over all tenants with their API clients.
    pub fn tenant_clients(&self) -> impl Iterator<Item = (&Tenant, &SyncClient)> {
        self.inner
            .registry
            .iter()
            .filter_map(|tenant| self.inner.clients.get(&tenant.domain).map(|c| (tenant, c)))
    }

    /// Number of configured tenants.
    #[must_use]
    pub fn tenant_count(&self) -> usize {
        self.inner.registry.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            public_base_url: "https://sync.volocommerce.com".to_string(),
            api_version: "2026-01".to_string(),
            tenants: vec![Tenant {
                domain: ShopDomain::parse("shop-a.myshopify.com").unwrap(),
                api_secret: SecretString::from("k9#mQ2$vX7!pL4@wN8%"),
                access_token: SecretString::from("shpat_4f8a2b9c1d6e3f7a"),
                related_products_enabled: true,
            }],
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    #[test]
    fn test_resolve_returns_tenant_and_client() {
        let state = AppState::new(test_config());
        let domain = ShopDomain::parse("shop-a.myshopify.com").unwrap();

        let (tenant, client) = state.resolve(&domain).unwrap();
        assert_eq!(tenant.domain, domain);
        assert_eq!(client.shop(), &domain);
    }

    #[test]
    fn test_resolve_unknown_domain() {
        let state = AppState::new(test_config());
        let domain = ShopDomain::parse("shop-x.myshopify.com").unwrap();
        assert!(state.resolve(&domain).is_none());
    }

    #[test]
    fn test_tenant_clients_iterates_all() {
        let state = AppState::new(test_config());
        assert_eq!(state.tenant_clients().count(), 1);
        assert_eq!(state.tenant_count(), 1);
    }
}
