//! Vendor settings with validation.
//!
//! Built once at start-up, validated, then shared read-only by every
//! component. Credentials may be left empty; operations that need them
//! fail with `setup-error` at call time.

use sl_crypto::{BoxKeyPair, Ed25519KeyPair, BOX_KEY_LEN};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Default helpdesk integration.
pub const DEFAULT_HELPDESK: &str = "helpscout";

/// Role approved for redirects when none are configured.
pub const DEFAULT_APPROVED_ROLE: &str = "administrator";

/// Default remote authority base URL.
pub const DEFAULT_API_URL: &str = "https://app.trustedlogin.com/api/v1/";

/// Main vendor configuration.
///
/// Secret fields are wiped from memory on drop.
#[derive(Clone)]
pub struct VendorSettings {
    /// Vendor account at the remote authority
    pub account_id: String,
    /// API auth key (`private_key`), sent as bearer token
    pub private_key: Zeroizing<String>,
    /// Account public key, input to the `X-TL-TOKEN` derivation
    pub public_key: String,
    /// Active helpdesk slug
    pub helpdesk: String,
    pub approved_roles: BTreeSet<String>,
    pub debug_enabled: bool,
    /// Public site root, used as the fallback redirect
    pub site_url: String,
    /// Admin area root
    pub admin_url: String,
    /// Remote authority base URL
    pub api_url: String,
    /// Shared secret for helpdesk webhooks
    pub helpscout_secret: Zeroizing<String>,
    /// Sealed box secret key (hex)
    pub box_secret_key: Zeroizing<String>,
    /// Ed25519 seed for identity proofs (hex)
    pub sign_secret_key: Zeroizing<String>,
}

impl Default for VendorSettings {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            private_key: Zeroizing::default(),
            public_key: String::new(),
            helpdesk: DEFAULT_HELPDESK.to_owned(),
            approved_roles: BTreeSet::from([DEFAULT_APPROVED_ROLE.to_owned()]),
            debug_enabled: true,
            site_url: "http://localhost".to_owned(),
            admin_url: "http://localhost/wp-admin".to_owned(),
            api_url: DEFAULT_API_URL.to_owned(),
            helpscout_secret: Zeroizing::default(),
            box_secret_key: Zeroizing::default(),
            sign_secret_key: Zeroizing::default(),
        }
    }
}

impl VendorSettings {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("site_url", &self.site_url),
            ("admin_url", &self.admin_url),
            ("api_url", &self.api_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.helpdesk.trim().is_empty() {
            return Err(ConfigError::Invalid("helpdesk cannot be empty".into()));
        }

        if self.approved_roles.is_empty() {
            return Err(ConfigError::NoApprovedRoles);
        }

        self.box_keypair()?;
        self.signing_keypair()?;

        Ok(())
    }

    /// Look up a plain setting by name; empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "account_id" => self.account_id.as_str(),
            "private_key" => self.private_key.as_str(),
            "public_key" => self.public_key.as_str(),
            "helpdesk" => self.helpdesk.as_str(),
            "site_url" => self.site_url.as_str(),
            "admin_url" => self.admin_url.as_str(),
            "api_url" => self.api_url.as_str(),
            "helpscout_secret" => self.helpscout_secret.as_str(),
            _ => return None,
        };
        Some(value).filter(|v| !v.is_empty())
    }

    pub fn approved_roles(&self) -> &BTreeSet<String> {
        &self.approved_roles
    }

    pub fn active_helpdesk(&self) -> &str {
        &self.helpdesk
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Account credentials, if all three are configured.
    pub fn credentials(&self) -> Option<AccountCredentials<'_>> {
        Some(AccountCredentials {
            account_id: self.get("account_id")?,
            private_key: self.get("private_key")?,
            public_key: self.get("public_key")?,
        })
    }

    /// Sealed box key pair, if configured.
    pub fn box_keypair(&self) -> Result<Option<BoxKeyPair>, ConfigError> {
        decode_key("box_secret_key", &self.box_secret_key)
            .map(|seed| seed.map(BoxKeyPair::from_secret_bytes))
    }

    /// Identity signing key pair, if configured.
    pub fn signing_keypair(&self) -> Result<Option<Ed25519KeyPair>, ConfigError> {
        decode_key("sign_secret_key", &self.sign_secret_key)
            .map(|seed| seed.map(Ed25519KeyPair::from_seed))
    }
}

impl fmt::Debug for VendorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &str| if v.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("VendorSettings")
            .field("account_id", &self.account_id)
            .field("private_key", &redact(&self.private_key))
            .field("public_key", &self.public_key)
            .field("helpdesk", &self.helpdesk)
            .field("approved_roles", &self.approved_roles)
            .field("debug_enabled", &self.debug_enabled)
            .field("site_url", &self.site_url)
            .field("admin_url", &self.admin_url)
            .field("api_url", &self.api_url)
            .field("helpscout_secret", &redact(&self.helpscout_secret))
            .field("box_secret_key", &redact(&self.box_secret_key))
            .field("sign_secret_key", &redact(&self.sign_secret_key))
            .finish()
    }
}

/// Borrowed view of the account credentials.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccountCredentials<'a> {
    pub account_id: &'a str,
    pub private_key: &'a str,
    pub public_key: &'a str,
}

impl fmt::Debug for AccountCredentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

fn decode_key(field: &'static str, encoded: &str) -> Result<Option<[u8; BOX_KEY_LEN]>, ConfigError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(None);
    }
    let mut bytes = hex::decode(encoded).map_err(|e| ConfigError::InvalidKey {
        field,
        reason: e.to_string(),
    })?;
    let actual = bytes.len();
    let seed: Result<[u8; BOX_KEY_LEN], _> = bytes.as_slice().try_into();
    bytes.zeroize();
    seed.map(Some).map_err(|_| ConfigError::InvalidKey {
        field,
        reason: format!("expected {BOX_KEY_LEN} bytes, got {actual}"),
    })
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid url for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("at least one approved role is required")]
    NoApprovedRoles,
    #[error("invalid key material in {field}: {reason}")]
    InvalidKey { field: &'static str, reason: String },
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
