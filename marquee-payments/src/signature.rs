//! Payment and webhook signature generation and verification
//!
//! Checkout callbacks are signed as `HMAC-SHA256(key_secret, "{order_id}|{payment_id}")`
//! and webhooks as `HMAC-SHA256(webhook_secret, raw_body)`, both rendered as
//! lowercase hex. Comparison against the presented value is exact and
//! constant-time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between order and payment IDs in the signed message
pub const PAYMENT_MESSAGE_SEPARATOR: char = '|';

/// Signature utility keyed by a shared secret
#[derive(Debug)]
pub struct PaymentSignature {
    secret: SecretString,
}

impl PaymentSignature {
    /// Create a new signature utility with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
        }
    }

    /// Create from an already-wrapped secret
    pub fn from_secret(secret: &SecretString) -> Self {
        Self::new(secret.expose_secret())
    }

    /// Expected checkout signature for an order/payment pair
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        let message = format!("{order_id}{PAYMENT_MESSAGE_SEPARATOR}{payment_id}");
        self.compute_hmac_sha256(message.as_bytes())
    }

    /// Check a client-presented checkout signature
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        constant_time_compare(signature, &self.sign(order_id, payment_id))
    }

    /// Signature over a raw payload (webhook bodies)
    pub fn sign_payload(&self, payload: &[u8]) -> String {
        self.compute_hmac_sha256(payload)
    }

    /// Check a signature over a raw payload
    pub fn verify_payload(&self, payload: &[u8], signature: &str) -> bool {
        constant_time_compare(signature.trim(), &self.sign_payload(payload))
    }

    fn compute_hmac_sha256(&self, data: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take any size key");
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Header names used by the provider
pub mod headers {
    /// Webhook body signature
    pub const WEBHOOK_SIGNATURE: &str = "x-razorpay-signature";

    /// Webhook event ID (for deduplication by consumers)
    pub const WEBHOOK_EVENT_ID: &str = "x-razorpay-event-id";
}
