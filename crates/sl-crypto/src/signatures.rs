//! # Nonce Signatures
//!
//! Every envelope request carries a random nonce (as base64 text) and an
//! Ed25519 signature over that exact text. The remote authority checks it
//! against the signature key this installation published.
//!
//! Signing is deterministic; the seed lives inside `SigningKey`, which
//! wipes itself on drop.

use crate::CryptoError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SIGNATURE_LENGTH};

/// Published half of the signing key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey(VerifyingKey);

impl Ed25519PublicKey {
    /// Lower-case hex, as served by the `signature_key` endpoint.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    /// Check `signature` over the nonce text.
    pub fn verify_nonce(&self, nonce: &str, signature: &Ed25519Signature) -> Result<(), CryptoError> {
        self.0
            .verify(nonce.as_bytes(), &signature.0)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Signature over one nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature(Signature);

impl Ed25519Signature {
    /// Standard base64, the `signedNonce` wire form.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0.to_bytes())
    }

    /// Parse the `signedNonce` wire form.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        let actual = bytes.len();
        let raw: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: SIGNATURE_LENGTH,
            actual,
        })?;
        Ok(Self(Signature::from_bytes(&raw)))
    }
}

/// Installation signing key.
pub struct Ed25519KeyPair(SigningKey);

impl Ed25519KeyPair {
    /// Fresh random key; tests and benches only need this.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Restore from the configured 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key())
    }

    /// Sign the nonce text exactly as it will be sent.
    pub fn sign_nonce(&self, nonce: &str) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(nonce.as_bytes()))
    }
}
