//! Webhook signature verification.
//!
//! Shopify signs every webhook delivery with HMAC-SHA256 over the exact raw
//! request body, base64-encoded into the `X-Shopify-Hmac-Sha256` header.
//! Verification must therefore run on the bytes as received - any JSON
//! round-trip before this point would invalidate the signature.
//!
//! This is the sole authorization gate for inbound events; no other request
//! field is trusted until it passes.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the tenant's signing secret.
///
/// Returns `false` on any mismatch, length difference, or missing/malformed
/// header value. Never panics and never allocates error state - a failed
/// verification is an expected outcome, not an exceptional one.
#[must_use]
pub fn verify_webhook_signature(raw_body: &[u8], signature_header: &str, secret: &str) -> bool {
    let provided = signature_header.trim();
    if provided.is_empty() {
        return false;
    }

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);

    let expected = BASE64.encode(mac.finalize().into_bytes());

    constant_time_compare(&expected, provided)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compute a valid signature the way Shopify does.
    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("valid key length");
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"id":632910392}"#;
        let signature = sign(body, "hush-a1b2c3d4e5");

        assert!(verify_webhook_signature(body, &signature, "hush-a1b2c3d4e5"));
    }

    #[test]
    fn test_tampered_body() {
        let body = br#"{"id":632910392}"#;
        let signature = sign(body, "hush-a1b2c3d4e5");

        let tampered = br#"{"id":632910393}"#;
        assert!(!verify_webhook_signature(tampered, &signature, "hush-a1b2c3d4e5"));
    }

    #[test]
    fn test_tampered_signature() {
        let body = br#"{"id":632910392}"#;
        let mut signature = sign(body, "hush-a1b2c3d4e5");

        // Flip the last character
        let last = signature.pop().expect("non-empty signature");
        signature.push(if last == 'A' { 'B' } else { 'A' });

        assert!(!verify_webhook_signature(body, &signature, "hush-a1b2c3d4e5"));
    }

    #[test]
    fn test_wrong_tenant_secret() {
        // A signature valid under tenant A's secret must fail under tenant B's,
        // even for identical body content.
        let body = br#"{"id":632910392}"#;
        let signature = sign(body, "tenant-a-k9mQ2vX7");

        assert!(verify_webhook_signature(body, &signature, "tenant-a-k9mQ2vX7"));
        assert!(!verify_webhook_signature(body, &signature, "tenant-b-pL4wN8rT"));
    }

    #[test]
    fn test_empty_header() {
        let body = br#"{"id":632910392}"#;
        assert!(!verify_webhook_signature(body, "", "hush-a1b2c3d4e5"));
        assert!(!verify_webhook_signature(body, "   ", "hush-a1b2c3d4e5"));
    }

    #[test]
    fn test_garbage_header() {
        let body = br#"{"id":632910392}"#;
        assert!(!verify_webhook_signature(
            body,
            "not base64 at all!!!",
            "hush-a1b2c3d4e5"
        ));
    }

    #[test]
    fn test_empty_body_still_signed() {
        // An empty body is unusual but must verify like any other byte string.
        let signature = sign(b"", "hush-a1b2c3d4e5");
        assert!(verify_webhook_signature(b"", &signature, "hush-a1b2c3d4e5"));
        assert!(!verify_webhook_signature(b"x", &signature, "hush-a1b2c3d4e5"));
    }
}
