use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SentinelError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a GitHub `X-Hub-Signature-256` header against the raw request body.
///
/// Returns `false` for an empty secret, body or header, and for any header
/// that is not `sha256=<hex>`. The digest comparison is constant-time.
pub fn verify(secret: &str, body: &[u8], signature_header: &str) -> bool {
    if secret.is_empty() || body.is_empty() || signature_header.is_empty() {
        tracing::warn!("missing secret, body or signature for webhook verification");
        return false;
    }

    match check(secret, body, signature_header) {
        Ok(()) => true,
        Err(reason) => {
            tracing::debug!(reason, "signature mismatch");
            false
        }
    }
}

fn check(secret: &str, body: &[u8], signature_header: &str) -> Result<(), String> {
    let signature_hex = signature_header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or_else(|| "missing sha256= prefix".to_string())?;

    let expected =
        hex::decode(signature_hex).map_err(|e| format!("invalid hex in signature: {e}"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("invalid HMAC key: {e}"))?;
    mac.update(body);

    mac.verify_slice(&expected)
        .map_err(|_| "HMAC verification failed".to_string())
}

/// Compute the `sha256=<hex>` header value GitHub would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, SentinelError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SentinelError::Other(format!("invalid HMAC key: {e}")))?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}
