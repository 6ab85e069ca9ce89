//! Webhook signature verification using HMAC-SHA256.
//!
//! The sender signs the raw body with the shared secret and sends the result in
//! `X-Hub-Signature-256` as `sha256=<hex>`. Verification happens before the
//! body is parsed; a failed check never reaches the decoder.
//!
//! Neither the secret nor any digest is ever logged from this module.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::headers::{Headers, HEADER_SIGNATURE};

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix required on the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// The shared webhook secret. Never empty; `Debug` does not reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    /// Wraps a secret, returning `None` when it is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

/// Verifies the signature header of a request against its raw body.
///
/// Returns `false` when the header is missing, lacks the `sha256=` prefix,
/// carries invalid hex, or does not match. Never panics.
pub fn verify(headers: &Headers, raw_body: &[u8], secret: &WebhookSecret) -> bool {
    match headers.get(HEADER_SIGNATURE) {
        Some(header) => verify_signature(raw_body, header, secret.as_bytes()),
        None => false,
    }
}

/// Verifies a `sha256=<hex>` header value against `payload`.
///
/// The comparison is constant-time (performed by the HMAC implementation).
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(expected) = parse_signature_header(signature_header) else {
        return false;
    };

    let Some(mac) = keyed_mac(payload, secret) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}

/// Parses `sha256=<hex>` into digest bytes. `None` for any malformed value.
///
/// Only lower-case hex is accepted, the form the sender produces; the digest
/// must match exactly as sent.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix(SIGNATURE_PREFIX)?;
    if !hex_sig.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 of `payload` under `secret`.
///
/// Used to sign requests in tests and tooling. `None` only if the HMAC
/// implementation rejects the key.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Option<Vec<u8>> {
    keyed_mac(payload, secret).map(|mac| mac.finalize().into_bytes().to_vec())
}

fn keyed_mac(payload: &[u8], secret: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(mac)
}

/// Formats digest bytes as a header value: `sha256=<lower-case hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{SIGNATURE_PREFIX}{}", hex::encode(signature))
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
