//! # Hashing
//!
//! Two content-derived digests are part of the wire contract:
//!
//! - `X-TL-TOKEN` = `hex(sha256(public_key || private_auth))`
//! - login endpoint = `hex(md5(site_url || identifier))`, which the customer
//!   site recomputes to authorize the inbound login.

use crate::mac::KeyedDigest;
use crate::CryptoError;
use sha2::{Digest, Sha256};

/// SHA-256 of the concatenated inputs, lower-case hex.
pub fn sha256_hex(inputs: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hex::encode(hasher.finalize())
}

/// Derive the outbound `X-TL-TOKEN` value.
pub fn token_for(public_key: &str, private_auth: &str) -> Result<String, CryptoError> {
    KeyedDigest::Sha256Token.derive(private_auth.as_bytes(), public_key.as_bytes())
}

/// MD5 of `input`, lower-case hex. Used as an opaque cache key.
pub fn md5_hex(input: &[u8]) -> String {
    format!("{:x}", md5::compute(input))
}

/// Endpoint hash of a login URL: MD5 over `site_url || identifier`.
pub fn endpoint_hash(site_url: &str, identifier: &str) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(site_url.as_bytes());
    ctx.consume(identifier.as_bytes());
    format!("{:x}", ctx.compute())
}
