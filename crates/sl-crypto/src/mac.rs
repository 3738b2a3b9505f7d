//! # Keyed Digests
//!
//! One derivation helper serves both trust directions:
//!
//! - **Inbound**: helpdesk webhooks carry `base64(HMAC-SHA1(secret, body))`;
//!   we recompute and compare.
//! - **Outbound**: calls to the remote authority carry
//!   `hex(sha256(public_key || private_auth))`; the far end recomputes.

use crate::hashing::sha256_hex;
use crate::CryptoError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Keyed derivation schemes used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyedDigest {
    /// `base64(HMAC-SHA1(key, message))` (helpdesk webhook signature)
    HmacSha1Base64,
    /// `hex(sha256(message || key))` (remote authority `X-TL-TOKEN`)
    Sha256Token,
}

impl KeyedDigest {
    /// Derive the encoded digest of `message` under `key`.
    pub fn derive(self, key: &[u8], message: &[u8]) -> Result<String, CryptoError> {
        match self {
            KeyedDigest::HmacSha1Base64 => {
                let mut mac =
                    HmacSha1::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
                        expected: 64,
                        actual: key.len(),
                    })?;
                mac.update(message);
                Ok(BASE64.encode(mac.finalize().into_bytes()))
            }
            KeyedDigest::Sha256Token => Ok(sha256_hex(&[message, key])),
        }
    }

    /// Recompute and compare against `provided` in constant time.
    ///
    /// Never errors: an empty key or empty `provided` value is simply
    /// "not verified".
    pub fn verify(self, key: &[u8], message: &[u8], provided: &str) -> bool {
        if key.is_empty() || provided.is_empty() {
            return false;
        }

        match self.derive(key, message) {
            Ok(expected) => constant_time_compare(&expected, provided),
            Err(_) => false,
        }
    }
}

/// `base64(HMAC-SHA1(secret, payload))`.
pub fn hmac_sha1_base64(secret: &[u8], payload: &[u8]) -> Result<String, CryptoError> {
    KeyedDigest::HmacSha1Base64.derive(secret, payload)
}

/// Constant-time string comparison to prevent timing attacks
///
/// Takes the same time regardless of how many characters match. Both
/// inputs are padded to the longer length with different fill bytes so a
/// length mismatch can never compare equal.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
