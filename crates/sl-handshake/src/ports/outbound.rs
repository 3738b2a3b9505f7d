//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the handshake depends on. The core only relies on these
//! contracts; concrete implementations live in `adapters/` or are supplied by
//! the embedding application.

use crate::domain::entities::{Actor, AuditAction, License};
use sl_crypto::CryptoError;
use std::collections::BTreeSet;
use thiserror::Error;

/// Error from a remote authority call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Non-2xx response
    #[error("Remote authority returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or timeout failure
    #[error("Could not reach remote authority: {0}")]
    Transport(String),

    /// Response body was not the expected JSON
    #[error("Malformed response from remote authority: {0}")]
    Decode(String),
}

/// HTTP verb for a remote authority call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Authenticated client for one sequence of calls to the remote authority.
pub trait AuthorityClient {
    /// Attach an extra header to every subsequent call.
    ///
    /// Returns `false` if the header could not be attached.
    fn set_header(&mut self, name: &str, value: &str) -> bool;

    /// Issue a single call. Non-2xx and undecodable responses are errors.
    fn call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        method: HttpMethod,
    ) -> Result<serde_json::Value, RemoteError>;
}

/// Factory for [`AuthorityClient`]s bound to the account's auth key.
pub trait AuthorityConnector: Send + Sync {
    type Client: AuthorityClient;

    fn connect(&self, auth: &str) -> Self::Client;
}

/// Asymmetric decryption used by the envelope unsealer.
pub trait EnvelopeCipher: Send + Sync {
    /// Open `ciphertext` (transport encoded) with the raw `nonce` and the
    /// sender's transport-encoded public key.
    fn decrypt(
        &self,
        ciphertext: &str,
        nonce: &[u8],
        peer_public_key: &str,
    ) -> Result<String, CryptoError>;
}

/// Append-only audit sink.
pub trait AuditLog: Send + Sync {
    /// Returns `false` if the entry was refused.
    fn append(&self, site_id: &str, action: AuditAction, actor_id: u64, note: Option<&str>)
        -> bool;
}

/// The requesting agent's session.
pub trait ActorSession {
    /// 0 when nobody is logged in
    fn current_actor_id(&self) -> u64;
    fn current_actor_roles(&self) -> BTreeSet<String>;
    fn display_name(&self) -> String;

    fn is_authenticated(&self) -> bool {
        self.current_actor_id() != 0
    }
}

impl ActorSession for Actor {
    fn current_actor_id(&self) -> u64 {
        self.id
    }

    fn current_actor_roles(&self) -> BTreeSet<String> {
        self.roles.clone()
    }

    fn display_name(&self) -> String {
        self.display_name.clone()
    }
}

/// Entitlement lookup used by the helpdesk webhook.
pub trait LicenseSource: Send + Sync {
    fn licenses_for(&self, email: &str) -> Result<Vec<License>, RemoteError>;
}
