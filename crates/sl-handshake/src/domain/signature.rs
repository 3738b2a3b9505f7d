//! # Signature Verifier
//!
//! Authenticates inbound helpdesk webhooks and derives the outbound
//! `X-TL-TOKEN` for remote authority calls. Both go through
//! [`KeyedDigest`], so the two directions cannot drift apart.

use crate::config::AccountCredentials;
use crate::domain::errors::HandshakeError;
use sl_crypto::{token_for, KeyedDigest};
use tracing::{debug, warn};

/// Header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-HELPSCOUT-SIGNATURE";

/// Header carrying the derived account token.
pub const TOKEN_HEADER: &str = "X-TL-TOKEN";

/// Verify `base64(HMAC-SHA1(secret, payload))` against `provided`.
///
/// Returns `false`, never an error, when the secret is unset or no
/// signature was supplied.
pub fn verify_webhook(payload: &[u8], provided: Option<&str>, secret: &[u8]) -> bool {
    let Some(provided) = provided else {
        debug!("webhook carried no signature");
        return false;
    };
    if secret.is_empty() {
        warn!("webhook secret not configured, rejecting");
        return false;
    }
    KeyedDigest::HmacSha1Base64.verify(secret, payload, provided)
}

/// `hex(sha256(public_key || private_auth))`.
pub fn auth_token(credentials: &AccountCredentials<'_>) -> Result<String, HandshakeError> {
    token_for(credentials.public_key, credentials.private_key).map_err(|_| HandshakeError::TokenHeader)
}

/// Stateful wrapper holding the configured webhook secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn verify(&self, payload: &[u8], provided: Option<&str>) -> bool {
        verify_webhook(payload, provided, &self.secret)
    }
}

impl Drop for SignatureVerifier {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.secret);
    }
}
