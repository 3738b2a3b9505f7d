//! Gateway configuration, read from `TL_*` environment variables.

use sl_handshake::{ConfigError, VendorSettings};
use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Error)]
pub enum GatewayConfigError {
    #[error("invalid {var}: {value}")]
    InvalidVar { var: &'static str, value: String },

    #[error(transparent)]
    Settings(#[from] ConfigError),
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub settings: VendorSettings,
    pub bind: SocketAddr,
    /// Shared with the session proxy; actor headers are ignored without it
    pub proxy_key: Option<Zeroizing<String>>,
    /// JSON license table served to the helpdesk webhook
    pub licenses_file: Option<PathBuf>,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("settings", &self.settings)
            .field("bind", &self.bind)
            .field("proxy_key", &self.proxy_key.as_ref().map(|_| "<redacted>"))
            .field("licenses_file", &self.licenses_file)
            .finish()
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<GatewayConfig, GatewayConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Whether `TL_DEBUG` asks for debug output; on unless explicitly off.
pub fn debug_requested() -> bool {
    std::env::var("TL_DEBUG")
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(true)
}

/// Build the configuration from any variable source.
pub fn from_lookup<F>(lookup: F) -> Result<GatewayConfig, GatewayConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
    let mut settings = VendorSettings::default();

    if let Some(v) = var("TL_ACCOUNT_ID") {
        settings.account_id = v;
    }
    if let Some(v) = var("TL_PRIVATE_KEY") {
        settings.private_key = Zeroizing::new(v);
    }
    if let Some(v) = var("TL_PUBLIC_KEY") {
        settings.public_key = v;
    }
    if let Some(v) = var("TL_HELPDESK") {
        settings.helpdesk = v.to_lowercase();
    }
    if let Some(v) = var("TL_APPROVED_ROLES") {
        settings.approved_roles = parse_roles(&v);
    }
    if let Some(v) = var("TL_DEBUG") {
        match parse_flag(&v) {
            Some(on) => settings.debug_enabled = on,
            None => warn!(value = %v, "Invalid TL_DEBUG, keeping default"),
        }
    }
    if let Some(v) = var("TL_SITE_URL") {
        settings.site_url = v;
    }
    if let Some(v) = var("TL_ADMIN_URL") {
        settings.admin_url = v;
    }
    if let Some(v) = var("TL_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("TL_HELPSCOUT_SECRET") {
        settings.helpscout_secret = Zeroizing::new(v);
    }
    if let Some(v) = var("TL_BOX_SECRET_KEY") {
        settings.box_secret_key = Zeroizing::new(v);
    }
    if let Some(v) = var("TL_SIGN_SECRET_KEY") {
        settings.sign_secret_key = Zeroizing::new(v);
    }

    settings.validate()?;

    let bind = match var("TL_BIND") {
        Some(v) => v
            .parse()
            .map_err(|_| GatewayConfigError::InvalidVar { var: "TL_BIND", value: v })?,
        None => DEFAULT_BIND
            .parse()
            .map_err(|_| GatewayConfigError::InvalidVar {
                var: "TL_BIND",
                value: DEFAULT_BIND.to_owned(),
            })?,
    };

    Ok(GatewayConfig {
        settings,
        bind,
        proxy_key: var("TL_PROXY_KEY").map(Zeroizing::new),
        licenses_file: var("TL_LICENSES_FILE").map(PathBuf::from),
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Some(true),
        "off" | "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_roles(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
        .collect()
}
