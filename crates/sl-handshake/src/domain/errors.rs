//! # Handshake Errors
//!
//! Every fallible handshake step returns one of these kinds. Each kind has a
//! stable machine code that is safe to write into the audit log.

use crate::ports::outbound::RemoteError;
use sl_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur during the support login handshake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// Missing or invalid required input (e.g. empty secret id)
    #[error("{0}")]
    DataError(String),

    /// Actor not authenticated or not authorized
    #[error("{0}")]
    AuthError(String),

    /// Required configuration absent
    #[error("{0}")]
    SetupError(String),

    /// Envelope shape or transport decoding failure
    #[error("The data received is not formatted correctly: {0}")]
    MalformedEnvelope(String),

    /// Opaque failure from the remote authority, message kept verbatim
    #[error("{0}")]
    RemoteError(#[from] RemoteError),

    /// Webhook or token verification failed
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// Identity proof could not be produced (signing key unavailable)
    #[error("Identity proof unavailable: {0}")]
    IdentityProof(String),

    /// Envelope identifier could not be opened
    #[error("Could not decrypt envelope: {0}")]
    Decryption(#[from] CryptoError),

    /// The `X-TL-TOKEN` header could not be attached
    #[error("Error setting X-TL-TOKEN header")]
    TokenHeader,
}

impl HandshakeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            HandshakeError::DataError(_) => "data-error",
            HandshakeError::AuthError(_) => "auth-error",
            HandshakeError::SetupError(_) => "setup-error",
            HandshakeError::MalformedEnvelope(_) => "malformed_envelope",
            HandshakeError::RemoteError(_) => "remote-error",
            HandshakeError::SignatureInvalid => "signature-invalid",
            HandshakeError::IdentityProof(_) => "identity-error",
            HandshakeError::Decryption(_) => "decryption-error",
            HandshakeError::TokenHeader => "x-tl-token-error",
        }
    }

    pub(crate) fn missing_credentials() -> Self {
        HandshakeError::SetupError("No auth, public key or account_id data found".into())
    }

    pub(crate) fn not_logged_in() -> Self {
        HandshakeError::AuthError("User not logged in.".into())
    }
}
