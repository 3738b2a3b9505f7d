//! # Envelope Unsealer
//!
//! Turns an envelope from the remote authority into the login URL of the
//! customer installation.
//!
//! ## Steps
//!
//! 1. Shape check (`identifier`, `siteUrl`, `publicKey`, `nonce`)
//! 2. Hex-decode the nonce
//! 3. Open the identifier with the envelope's public key and our secret key
//! 4. `endpoint_hash = md5(siteUrl || identifier)`
//! 5. `{siteUrl}/{endpoint_hash}/{identifier}`
//!
//! Each step fails on its own; no step runs after a failed one.

use crate::domain::entities::{Envelope, LoginUrl, SiteLink};
use crate::domain::errors::HandshakeError;
use crate::ports::outbound::EnvelopeCipher;
use sl_crypto::endpoint_hash;
use tracing::debug;

pub struct EnvelopeUnsealer<X: EnvelopeCipher> {
    cipher: X,
}

impl<X: EnvelopeCipher> EnvelopeUnsealer<X> {
    pub fn new(cipher: X) -> Self {
        Self { cipher }
    }

    /// Unseal to the bare login URL.
    pub fn unseal(&self, envelope: Envelope) -> Result<LoginUrl, HandshakeError> {
        self.unseal_parts(envelope).map(|link| link.login_url)
    }

    /// Unseal to `{site_url, login_url}` for the disambiguation list.
    pub fn unseal_parts(&self, envelope: Envelope) -> Result<SiteLink, HandshakeError> {
        let fields = envelope.fields()?;

        let nonce = hex::decode(fields.nonce.trim()).map_err(|e| {
            HandshakeError::MalformedEnvelope(format!("nonce is not hex: {e}"))
        })?;

        let identifier = self
            .cipher
            .decrypt(&fields.identifier, &nonce, &fields.public_key)?;

        let hash = endpoint_hash(&fields.site_url, &identifier);
        debug!(site_url = %fields.site_url, "envelope unsealed");

        Ok(SiteLink {
            login_url: LoginUrl::compose(&fields.site_url, &hash, &identifier),
            site_url: fields.site_url,
        })
    }
}
