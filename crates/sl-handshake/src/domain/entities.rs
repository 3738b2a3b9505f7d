//! # Domain Entities
//!
//! Core data structures of the support login handshake.

use crate::domain::errors::HandshakeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque key pasted by an agent; resolved remotely to secret ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessKey(String);

impl AccessKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-destination identifier used to request an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(String);

impl SecretId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Identity proof
// =============================================================================

/// Single-use proof of this installation's identity.
///
/// Serialized into the envelope request as `nonce` / `signedNonce`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentityNonce {
    /// Base64 of 32 random bytes
    pub nonce: String,
    /// Base64 Ed25519 signature over the `nonce` text
    #[serde(rename = "signedNonce")]
    pub signed_nonce: String,
}

// =============================================================================
// Envelope
// =============================================================================

/// Envelope exactly as received from the remote authority.
///
/// The shape is only checked when it is unsealed. Unsealing takes the
/// envelope by value, so one fetched envelope serves one redirect attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(serde_json::Value);

/// Keys every envelope must carry.
pub const REQUIRED_ENVELOPE_KEYS: [&str; 4] = ["identifier", "siteUrl", "publicKey", "nonce"];

impl Envelope {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Validate the shape and pull out the sealed fields.
    ///
    /// # Errors
    /// `MalformedEnvelope` if the value is not an object or any of
    /// [`REQUIRED_ENVELOPE_KEYS`] is absent or not a string.
    pub fn fields(&self) -> Result<EnvelopeFields, HandshakeError> {
        let object = self
            .0
            .as_object()
            .ok_or_else(|| HandshakeError::MalformedEnvelope("envelope is not an object".into()))?;

        let text = |key: &str| -> Result<String, HandshakeError> {
            object
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .ok_or_else(|| HandshakeError::MalformedEnvelope(format!("missing `{key}`")))
        };

        Ok(EnvelopeFields {
            identifier: text("identifier")?,
            site_url: text("siteUrl")?,
            public_key: text("publicKey")?,
            nonce: text("nonce")?,
            expiry: object.get("expiry").and_then(|v| v.as_i64()),
        })
    }
}

/// Validated envelope fields, still sealed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeFields {
    /// Box ciphertext of the support user identifier (base64)
    pub identifier: String,
    /// Customer site URL
    pub site_url: String,
    /// Customer box public key (hex)
    pub public_key: String,
    /// Box nonce (hex)
    pub nonce: String,
    /// Unix time the support user decays, if provided
    pub expiry: Option<i64>,
}

// =============================================================================
// Login URL
// =============================================================================

/// `{site_url}/{endpoint_hash}/{identifier}`.
///
/// Grants a login, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginUrl(String);

impl LoginUrl {
    pub fn compose(site_url: &str, endpoint_hash: &str, identifier: &str) -> Self {
        Self(format!("{site_url}/{endpoint_hash}/{identifier}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for LoginUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginUrl(<redacted>)")
    }
}

impl Serialize for LoginUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One candidate destination offered to the actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteLink {
    #[serde(rename = "siteUrl")]
    pub site_url: String,
    #[serde(rename = "loginUrl")]
    pub login_url: LoginUrl,
}

// =============================================================================
// Actor
// =============================================================================

/// Snapshot of the requesting agent's session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Actor {
    /// 0 when anonymous
    pub id: u64,
    pub display_name: String,
    pub roles: BTreeSet<String>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new<I, S>(id: u64, display_name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            display_name: display_name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Protocol step recorded in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Requested,
    Received,
    Redirected,
    Failed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Requested => "requested",
            AuditAction::Received => "received",
            AuditAction::Redirected => "redirected",
            AuditAction::Failed => "failed",
        }
    }
}

/// Immutable audit record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub id: u64,
    pub site_id: String,
    pub action: AuditAction,
    pub actor_user_id: u64,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

// =============================================================================
// Redirect outcome
// =============================================================================

/// Which status a redirect is issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectStatus {
    /// To the login URL (HTTP 302)
    Success,
    /// To the fallback URL (HTTP 303)
    Error,
}

impl RedirectStatus {
    pub fn http_status(&self) -> u16 {
        match self {
            RedirectStatus::Success => 302,
            RedirectStatus::Error => 303,
        }
    }
}

/// A terminal redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub status: RedirectStatus,
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match self.status {
            RedirectStatus::Success => "<login url>",
            RedirectStatus::Error => self.location.as_str(),
        };
        f.debug_struct("Redirect")
            .field("location", &location)
            .field("status", &self.status)
            .finish()
    }
}

/// What the boundary layer should do with the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Not a redirect request, or silently declined
    NoOp,
    /// Issue this redirect and stop
    Redirect(Redirect),
    /// Present these destinations for the actor to pick from
    ChooseSite(Vec<SiteLink>),
}

// =============================================================================
// Webhook widget
// =============================================================================

/// A license as reported by the entitlement source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    pub status: String,
}

/// One authorized session shown in the helpdesk widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetItem {
    #[serde(rename = "licenseKey")]
    pub license_key: String,
    pub status: String,
    pub url: String,
}

/// Webhook answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetResponse {
    pub items: Vec<WidgetItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
