//! # Sealed Box
//!
//! Public-key authenticated encryption (X25519 + XSalsa20-Poly1305), wire
//! compatible with libsodium's `crypto_box`.
//!
//! The customer installation seals the envelope identifier to our box
//! public key with its own key pair; we open it with our secret key and the
//! peer public key carried in the envelope.

use crate::CryptoError;
use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of box public and secret keys.
pub const BOX_KEY_LEN: usize = 32;

/// Length of the box nonce.
pub const BOX_NONCE_LEN: usize = 24;

/// X25519 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxPublicKey([u8; BOX_KEY_LEN]);

impl BoxPublicKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; BOX_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded key.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        let actual = bytes.len();
        let arr: [u8; BOX_KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: BOX_KEY_LEN,
            actual,
        })?;
        Ok(Self(arr))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; BOX_KEY_LEN] {
        &self.0
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Box key pair; the secret half is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BoxKeyPair {
    secret: [u8; BOX_KEY_LEN],
}

impl BoxKeyPair {
    /// Generate a random key pair.
    pub fn generate() -> Self {
        let mut secret = [0u8; BOX_KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut secret);
        Self { secret }
    }

    /// Restore from a 32-byte secret key.
    pub fn from_secret_bytes(secret: [u8; BOX_KEY_LEN]) -> Self {
        Self { secret }
    }

    /// Derive the public key.
    pub fn public_key(&self) -> BoxPublicKey {
        let public = SecretKey::from(self.secret).public_key();
        BoxPublicKey(*public.as_bytes())
    }

    fn salsa_box(&self, peer: &BoxPublicKey) -> SalsaBox {
        SalsaBox::new(&PublicKey::from(peer.0), &SecretKey::from(self.secret))
    }

    /// Open a box sealed to us by `peer`.
    ///
    /// # Errors
    ///
    /// - `InvalidNonceLength` if `nonce` is not 24 bytes
    /// - `DecryptionFailed` on wrong key, wrong nonce or tampered ciphertext
    pub fn open(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        peer: &BoxPublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce)?;
        self.salsa_box(peer)
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }

    /// Seal `plaintext` for `peer`.
    pub fn seal(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
        peer: &BoxPublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce)?;
        self.salsa_box(peer)
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }
}

/// Generate a random box nonce.
pub fn generate_nonce() -> [u8; BOX_NONCE_LEN] {
    let mut bytes = [0u8; BOX_NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    bytes
}

fn check_nonce(nonce: &[u8]) -> Result<(), CryptoError> {
    if nonce.len() != BOX_NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: BOX_NONCE_LEN,
            actual: nonce.len(),
        });
    }
    Ok(())
}
