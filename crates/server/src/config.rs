//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PUBLIC_BASE_URL` - Public URL of this server (used for webhook callback registration)
//! - `SHOPIFY_SHOPS` - Comma-separated shop domains (e.g. `volo-living.myshopify.com`)
//! - `SHOPIFY_API_SECRET_<SLUG>` - Webhook signing secret, one per shop
//! - `SHOPIFY_ACCESS_TOKEN_<SLUG>` - Admin API access token, one per shop
//!
//! `<SLUG>` is the shop domain uppercased with every non-alphanumeric
//! character replaced by `_` (e.g. `VOLO_LIVING_MYSHOPIFY_COM`). Adding a
//! tenant is therefore a configuration change, not a code change.
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `RELATED_PRODUCTS_SHOPS` - Subset of `SHOPIFY_SHOPS` for which the
//!   related-products sync runs (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (0.0 to 1.0)
//!
//! ## Optional (TLS)
//! - `TLS_CERT` - PEM-encoded certificate chain
//! - `TLS_KEY` - PEM-encoded private key

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;
use volo_sync_core::ShopDomain;

use crate::tenants::Tenant;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2026-01";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this server, without trailing slash
    pub public_base_url: String,
    /// Shopify API version (e.g. 2026-01)
    pub api_version: String,
    /// Tenants, one per configured shop
    pub tenants: Vec<Tenant>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("TLS_CERT");
        let key_pem = get_optional_env("TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "TLS_*".to_string(),
                "Both TLS_CERT and TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let public_base_url = parse_base_url(&get_required_env("PUBLIC_BASE_URL")?)?;
        let api_version = get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);

        let shops = parse_shop_domains(&get_required_env("SHOPIFY_SHOPS")?)?;
        let related = parse_related_shops(
            get_optional_env("RELATED_PRODUCTS_SHOPS").as_deref(),
            &shops,
        )?;

        let tenants = shops
            .into_iter()
            .map(|domain| {
                let slug = env_slug(&domain);
                let api_secret = get_validated_secret(&format!("SHOPIFY_API_SECRET_{slug}"))?;
                let access_token = get_validated_secret(&format!("SHOPIFY_ACCESS_TOKEN_{slug}"))?;
                Ok(Tenant {
                    related_products_enabled: related.contains(&domain),
                    domain,
                    api_secret,
                    access_token,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            host,
            port,
            public_base_url,
            api_version,
            tenants,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Derive the env-var slug for a shop domain.
///
/// `volo-living.myshopify.com` becomes `VOLO_LIVING_MYSHOPIFY_COM`.
fn env_slug(domain: &ShopDomain) -> String {
    domain
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Validate and normalize the public base URL (no trailing slash).
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("PUBLIC_BASE_URL".to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            "PUBLIC_BASE_URL".to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse the comma-separated `SHOPIFY_SHOPS` value.
fn parse_shop_domains(raw: &str) -> Result<Vec<ShopDomain>, ConfigError> {
    let mut seen = HashSet::new();
    let mut shops = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let domain = ShopDomain::parse(entry).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_SHOPS".to_string(), format!("`{entry}`: {e}"))
        })?;
        if !seen.insert(domain.clone()) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_SHOPS".to_string(),
                format!("duplicate shop domain `{entry}`"),
            ));
        }
        shops.push(domain);
    }

    if shops.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPIFY_SHOPS".to_string(),
            "at least one shop domain is required".to_string(),
        ));
    }

    Ok(shops)
}

/// Parse `RELATED_PRODUCTS_SHOPS` and check it is a subset of the shop list.
fn parse_related_shops(
    raw: Option<&str>,
    shops: &[ShopDomain],
) -> Result<HashSet<ShopDomain>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(HashSet::new());
    };

    let known: HashSet<&ShopDomain> = shops.iter().collect();
    let mut related = HashSet::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let domain = ShopDomain::parse(entry).map_err(|e| {
            ConfigError::InvalidEnvVar(
                "RELATED_PRODUCTS_SHOPS".to_string(),
                format!("`{entry}`: {e}"),
            )
        })?;
        if !known.contains(&domain) {
            return Err(ConfigError::InvalidEnvVar(
                "RELATED_PRODUCTS_SHOPS".to_string(),
                format!("`{entry}` is not listed in SHOPIFY_SHOPS"),
            ));
        }
        related.insert(domain);
    }

    Ok(related)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn domain(s: &str) -> ShopDomain {
        ShopDomain::parse(s).unwrap()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_env_slug() {
        assert_eq!(
            env_slug(&domain("volo-living.myshopify.com")),
            "VOLO_LIVING_MYSHOPIFY_COM"
        );
        assert_eq!(env_slug(&domain("shop2.example.io")), "SHOP2_EXAMPLE_IO");
    }

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let url = parse_base_url("https://sync.volocommerce.com/").unwrap();
        assert_eq!(url, "https://sync.volocommerce.com");
    }

    #[test]
    fn test_parse_base_url_rejects_bad_scheme() {
        assert!(parse_base_url("ftp://sync.volocommerce.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_shop_domains_valid() {
        let shops =
            parse_shop_domains("shop-a.myshopify.com, shop-b.myshopify.com").unwrap();
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].as_str(), "shop-a.myshopify.com");
        assert_eq!(shops[1].as_str(), "shop-b.myshopify.com");
    }

    #[test]
    fn test_parse_shop_domains_rejects_empty() {
        assert!(parse_shop_domains("").is_err());
        assert!(parse_shop_domains(" , ").is_err());
    }

    #[test]
    fn test_parse_shop_domains_rejects_duplicates() {
        let result = parse_shop_domains("shop-a.myshopify.com,shop-a.myshopify.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_shop_domains_rejects_invalid() {
        assert!(parse_shop_domains("Not A Domain").is_err());
    }

    #[test]
    fn test_parse_related_shops_none() {
        let shops = vec![domain("shop-a.myshopify.com")];
        let related = parse_related_shops(None, &shops).unwrap();
        assert!(related.is_empty());
    }

    #[test]
    fn test_parse_related_shops_subset() {
        let shops = vec![
            domain("shop-a.myshopify.com"),
            domain("shop-b.myshopify.com"),
        ];
        let related = parse_related_shops(Some("shop-b.myshopify.com"), &shops).unwrap();
        assert!(related.contains(&domain("shop-b.myshopify.com")));
        assert!(!related.contains(&domain("shop-a.myshopify.com")));
    }

    #[test]
    fn test_parse_related_shops_rejects_unknown() {
        let shops = vec![domain("shop-a.myshopify.com")];
        let result = parse_related_shops(Some("shop-c.myshopify.com"), &shops);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            public_base_url: "https://sync.volocommerce.com".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            tenants: vec![],
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
