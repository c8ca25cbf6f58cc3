//! Shopify webhook intake.
//!
//! The handler acknowledges a verified webhook immediately and hands the
//! actual reconciliation to a detached task; the 200 response says "event
//! accepted", never "sync succeeded". Shopify expects the acknowledgment
//! within a few seconds, and reconciliation can take longer than that.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};
use volo_sync_core::{ProductId, ShopDomain};

use crate::error::AppError;
use crate::signature::verify_webhook_signature;
use crate::state::AppState;
use crate::sync;

/// Path the webhook subscriptions point at.
pub const WEBHOOK_PATH: &str = "/webhooks-filtered";

/// Header carrying the base64 HMAC-SHA256 of the raw body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Header carrying the originating shop domain.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Header carrying the webhook topic (logged only).
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Create webhook routes.
pub fn router() -> Router<AppState> {
    Router::new().route(WEBHOOK_PATH, post(handle_product_update))
}

/// The only field of the product-update payload this service consumes.
#[derive(Debug, Deserialize)]
struct ProductUpdatePayload {
    id: u64,
}

/// Handle a Shopify product-update webhook.
///
/// Order matters here: resolve the tenant, verify the signature against the
/// raw body bytes, and only then look at the payload. Nothing in the request
/// is trusted before the signature check passes, and the body is never
/// re-serialized before verification.
#[instrument(skip(state, headers, body))]
async fn handle_product_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get(HMAC_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".into()))?;

    let shop_header = headers
        .get(SHOP_DOMAIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing shop domain header".into()))?;

    // An unparsable domain can never match a configured tenant; reject it
    // the same way as an unknown one, before any HMAC work.
    let domain = ShopDomain::parse(shop_header)
        .map_err(|_| AppError::Unauthorized("Unknown shop domain".into()))?;

    let Some((tenant, client)) = state.resolve(&domain) else {
        warn!(shop = %domain, "webhook from unknown shop");
        return Err(AppError::Unauthorized("Unknown shop domain".into()));
    };

    if !verify_webhook_signature(&body, signature, tenant.api_secret.expose_secret()) {
        warn!(shop = %domain, "webhook signature verification failed");
        return Err(AppError::Unauthorized("Invalid webhook signature".into()));
    }

    // The payload is trusted from here on.
    let payload: ProductUpdatePayload = serde_json::from_slice(&body).map_err(|e| {
        error!(shop = %domain, error = %e, "malformed product update payload");
        AppError::Internal(format!("Malformed webhook body: {e}"))
    })?;

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    debug!(shop = %domain, topic, product = payload.id, "accepted product update webhook");

    // Acknowledge now; reconciliation runs detached and reports via logs only.
    sync::dispatch(
        tenant.clone(),
        client.clone(),
        ProductId::new(payload.id),
    );

    Ok(StatusCode::OK)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use hmac::{Hmac, Mac};
    use secrecy::SecretString;
    use sha2::Sha256;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::tenants::Tenant;

    const TEST_SECRET: &str = "hush-k9mQ2vX7pL4wN8";
    const TEST_SHOP: &str = "volo-test.myshopify.com";

    fn test_state() -> AppState {
        AppState::new(AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            public_base_url: "https://sync.volocommerce.com".to_string(),
            api_version: "2026-01".to_string(),
            tenants: vec![Tenant {
                domain: ShopDomain::parse(TEST_SHOP).unwrap(),
                api_secret: SecretString::from(TEST_SECRET),
                access_token: SecretString::from("shpat_4f8a2b9c1d6e3f7a"),
                related_products_enabled: false,
            }],
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        })
    }

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("valid key length");
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    async fn send(
        shop: Option<&str>,
        signature: Option<&str>,
        body: &'static [u8],
    ) -> StatusCode {
        let app = router().with_state(test_state());

        let mut request = Request::builder().method("POST").uri(WEBHOOK_PATH);
        if let Some(shop) = shop {
            request = request.header(SHOP_DOMAIN_HEADER, shop);
        }
        if let Some(signature) = signature {
            request = request.header(HMAC_HEADER, signature);
        }

        let response = app
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_signature_header() {
        let status = send(Some(TEST_SHOP), None, br#"{"id":123}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_shop_header() {
        let body = br#"{"id":123}"#;
        let signature = sign(body, TEST_SECRET);
        let status = send(None, Some(&signature), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_shop() {
        let body = br#"{"id":123}"#;
        let signature = sign(body, TEST_SECRET);
        let status = send(Some("stranger.myshopify.com"), Some(&signature), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_signature() {
        let body = br#"{"id":123}"#;
        let signature = sign(body, "some-other-secret-pQ7rT0");
        let status = send(Some(TEST_SHOP), Some(&signature), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_after_valid_signature() {
        // The signature is valid for these bytes, but they are not a product
        // update payload: a synchronous server error, not an auth failure.
        let body = b"definitely not json";
        let signature = sign(body, TEST_SECRET);
        let status = send(Some(TEST_SHOP), Some(&signature), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_valid_webhook_is_accepted() {
        // The 200 only acknowledges receipt; the detached reconciliation
        // task fails against the unreachable test shop and logs.
        let body = br#"{"id":632910392,"title":"Hoodie"}"#;
        let signature = sign(body, TEST_SECRET);
        let status = send(Some(TEST_SHOP), Some(&signature), body).await;
        assert_eq!(status, StatusCode::OK);
    }
}
