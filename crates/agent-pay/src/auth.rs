//! Webhook signatures and secret comparison.
//!
//! A webhook sender signs the raw request body with HMAC-SHA256 under the
//! shared webhook secret and puts the hex tag in
//! [`WEBHOOK_SIGNATURE_HEADER`](crate::WEBHOOK_SIGNATURE_HEADER). The server
//! checks it with [`verify_signature`] before the orchestrator sees the payload.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type WebhookMac = Hmac<Sha256>;

fn keyed(secret: &[u8], body: &[u8]) -> WebhookMac {
    let mut mac =
        WebhookMac::new_from_slice(secret).expect("HMAC-SHA256 takes keys of any length");
    mac.update(body);
    mac
}

/// Hex tag a sender attaches to `body`.
pub fn sign_payload(secret: &[u8], body: &[u8]) -> String {
    hex::encode(keyed(secret, body).finalize().into_bytes())
}

/// True when `signature` is the hex tag of `body` under `secret`.
///
/// Case and surrounding whitespace in the header value are ignored. The tag
/// comparison itself is constant time.
pub fn verify_signature(secret: &[u8], body: &[u8], signature: &str) -> bool {
    match hex::decode(signature.trim()) {
        Ok(tag) => keyed(secret, body).verify_slice(&tag).is_ok(),
        Err(_) => false,
    }
}

/// Compare a presented token with the configured one.
///
/// Both sides are hashed first, so neither content nor length shows in timing.
pub fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    Sha256::digest(presented)
        .ct_eq(&Sha256::digest(expected))
        .into()
}
