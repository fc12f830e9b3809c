//! Event payload signature verification.
//!
//! The platform signs every event delivery with HMAC-SHA1 over the raw body,
//! keyed by the app secret, and sends it as `X-Hub-Signature: sha1=<hex>`.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::WebhookError;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// The only signing method the platform uses on this header.
pub const SIGNATURE_METHOD: &str = "sha1";

/// Split a signature header value into its hex hash.
///
/// The value is split on the first `=`; the method must be `sha1` and the
/// hash must be non-empty.
pub fn parse_signature_header(value: &str) -> Result<&str, WebhookError> {
    match value.split_once('=') {
        Some((SIGNATURE_METHOD, hash)) if !hash.is_empty() => Ok(hash),
        _ => {
            warn!(
                header_length = value.len(),
                has_separator = value.contains('='),
                "signature_bad_format"
            );
            Err(WebhookError::BadSignatureFormat)
        }
    }
}

/// Lowercase hex HMAC-SHA1 of `body` keyed by `secret`.
pub fn compute_digest(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("signature_invalid_key");
            return None;
        }
    };
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Full header value (`sha1=<hex>`) for a body, as the platform would send it.
pub fn sign_payload(secret: &str, body: &[u8]) -> Option<String> {
    compute_digest(secret, body).map(|digest| format!("{SIGNATURE_METHOD}={digest}"))
}

/// Check `hash` (the part after `sha1=`) against the body's digest.
///
/// A length difference returns early, before the constant-time comparison.
/// The digest length is public (40 hex chars), so this only reveals the
/// length of the caller's own guess.
pub fn verify_signature(secret: &str, body: &[u8], hash: &str) -> bool {
    let Some(digest) = compute_digest(secret, body) else {
        return false;
    };

    if digest.len() != hash.len() {
        warn!(
            expected_length = digest.len(),
            actual_length = hash.len(),
            "signature_length_mismatch"
        );
        return false;
    }

    let valid: bool = digest.as_bytes().ct_eq(hash.as_bytes()).into();
    if !valid {
        warn!(body_length = body.len(), "signature_mismatch");
    }
    valid
}
