//! # Support Login Handshake
//!
//! Turns an opaque access key pasted by a support agent into a verified,
//! one-time login redirect into a customer installation, without the agent
//! ever seeing that installation's credentials.
//!
//! ## Architecture
//!
//! Hexagonal, like the rest of the workspace:
//! - **Domain Layer** (`domain/`): envelope unsealing, identity proofs,
//!   signature checks, request parsing. No I/O.
//! - **Ports Layer** (`ports/`): inbound API and outbound collaborators
//! - **Service Layer** (`service/`): redirect orchestrator, webhook handler
//! - **Adapters** (`adapters/`): HTTP authority client, sealed box cipher,
//!   in-memory audit log, static license table
//!
//! ## Security Notes
//!
//! - Login URLs are never logged and never stored
//! - Every envelope request carries a fresh signed nonce
//! - Webhook bodies are authenticated before they are parsed
//! - Each envelope fetch is bracketed by audit entries

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;


// Re-export public API
pub use config::{AccountCredentials, ConfigError, VendorSettings};
pub use domain::entities::{
    AccessKey, Actor, AuditAction, AuditEntry, Envelope, IdentityNonce, License, LoginUrl,
    Redirect, RedirectOutcome, RedirectStatus, SecretId, SiteLink, WidgetItem, WidgetResponse,
};
pub use domain::envelope::EnvelopeUnsealer;
pub use domain::errors::HandshakeError;
pub use domain::identity::IdentityProofBuilder;
pub use domain::request::{RedirectRequest, REDIRECT_TRIGGER};
pub use domain::signature::{SignatureVerifier, TOKEN_HEADER, WEBHOOK_SIGNATURE_HEADER};
pub use ports::inbound::{RedirectApi, WebhookApi};
pub use ports::outbound::{
    ActorSession, AuditLog, AuthorityClient, AuthorityConnector, EnvelopeCipher, HttpMethod,
    LicenseSource, RemoteError,
};
pub use service::{RedirectOrchestrator, RemoteAuthority, WebhookHandler};
