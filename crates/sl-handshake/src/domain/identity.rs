//! # Identity Proof Builder
//!
//! Every envelope request carries a fresh random nonce and an Ed25519
//! signature over it, so the remote authority can check the request came
//! from the installation that registered the matching signature key.

use crate::domain::entities::IdentityNonce;
use crate::domain::errors::HandshakeError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sl_crypto::{Ed25519KeyPair, Ed25519PublicKey};

/// Random bytes per nonce.
pub const NONCE_LEN: usize = 32;

pub struct IdentityProofBuilder {
    signing_key: Option<Ed25519KeyPair>,
}

impl IdentityProofBuilder {
    pub fn new(signing_key: Ed25519KeyPair) -> Self {
        Self {
            signing_key: Some(signing_key),
        }
    }

    /// Builder with no key; every proof request fails.
    pub fn unavailable() -> Self {
        Self { signing_key: None }
    }

    pub fn from_key(signing_key: Option<Ed25519KeyPair>) -> Self {
        Self { signing_key }
    }

    /// Verifying key to publish, if a signing key is loaded.
    pub fn public_key(&self) -> Option<Ed25519PublicKey> {
        self.signing_key.as_ref().map(Ed25519KeyPair::public_key)
    }

    /// Produce a fresh `{nonce, signedNonce}` pair.
    ///
    /// The signature covers the base64 nonce text exactly as sent.
    ///
    /// # Errors
    /// `IdentityProof` when no signing key is available.
    pub fn create_identity_nonce(&self) -> Result<IdentityNonce, HandshakeError> {
        let key = self.signing_key.as_ref().ok_or_else(|| {
            HandshakeError::IdentityProof("signing key unavailable".into())
        })?;

        let mut raw = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut raw);
        let nonce = BASE64.encode(raw);
        let signature = key.sign_nonce(&nonce);

        Ok(IdentityNonce {
            signed_nonce: signature.to_base64(),
            nonce,
        })
    }
}
