//! Sealed box implementation of [`EnvelopeCipher`].
//!
//! Envelope identifiers arrive as base64 box ciphertext; the sender's
//! public key arrives hex encoded.

use crate::ports::outbound::EnvelopeCipher;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sl_crypto::{BoxKeyPair, BoxPublicKey, CryptoError};

pub struct SealedBoxCipher {
    keypair: BoxKeyPair,
}

impl SealedBoxCipher {
    pub fn new(keypair: BoxKeyPair) -> Self {
        Self { keypair }
    }

    pub fn public_key(&self) -> BoxPublicKey {
        self.keypair.public_key()
    }
}

impl EnvelopeCipher for SealedBoxCipher {
    fn decrypt(
        &self,
        ciphertext: &str,
        nonce: &[u8],
        peer_public_key: &str,
    ) -> Result<String, CryptoError> {
        let sealed = BASE64
            .decode(ciphertext.trim())
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        let peer = BoxPublicKey::from_hex(peer_public_key)?;
        let plaintext = self.keypair.open(&sealed, nonce, &peer)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidPlaintext)
    }
}
