//! Assembles the handshake services from configuration.
//!
//! Builds a blocking HTTP client, so it must run before the async runtime
//! starts.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::router::{AppState, PublishedKeys};
use sl_crypto::BoxKeyPair;
use sl_handshake::adapters::{
    HttpAuthorityConnector, InMemoryAuditLog, SealedBoxCipher, StaticLicenseSource,
};
use sl_handshake::{
    IdentityProofBuilder, RedirectOrchestrator, RemoteAuthority, VendorSettings, WebhookHandler,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Services {
    pub state: AppState,
    pub audit: Arc<InMemoryAuditLog>,
    settings: Arc<VendorSettings>,
    authority: RemoteAuthority<HttpAuthorityConnector>,
}

pub fn build_services(config: &GatewayConfig) -> Result<Services, GatewayError> {
    let settings = Arc::new(config.settings.clone());
    let connector = HttpAuthorityConnector::new(settings.api_url.clone())?;

    let box_keypair = settings.box_keypair()?;
    let public_key = box_keypair.as_ref().map(|k| k.public_key().to_hex());
    let cipher = match box_keypair {
        Some(keypair) => SealedBoxCipher::new(keypair),
        None => {
            warn!("TL_BOX_SECRET_KEY not set, envelopes cannot be opened");
            SealedBoxCipher::new(BoxKeyPair::generate())
        }
    };

    let identity = IdentityProofBuilder::from_key(settings.signing_keypair()?);
    let signature_key = identity.public_key().map(|k| k.to_hex());
    if signature_key.is_none() {
        warn!("TL_SIGN_SECRET_KEY not set, identity proofs are unavailable");
    }

    let licenses = match &config.licenses_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| GatewayError::Licenses {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let source = StaticLicenseSource::from_json(&raw).map_err(|e| GatewayError::Licenses {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            info!(customers = source.len(), "license table loaded");
            source
        }
        None => StaticLicenseSource::default(),
    };

    let audit = Arc::new(InMemoryAuditLog::new());
    let redirect = RedirectOrchestrator::new(
        Arc::clone(&settings),
        connector.clone(),
        identity,
        cipher,
        Arc::clone(&audit),
    );
    let webhook = WebhookHandler::new(Arc::clone(&settings), connector.clone(), licenses);

    let healthy = settings.validate().is_ok()
        && settings.credentials().is_some()
        && public_key.is_some()
        && signature_key.is_some();

    let state = AppState {
        redirect: Arc::new(redirect),
        webhook: Arc::new(webhook),
        keys: PublishedKeys {
            public_key,
            signature_key,
        },
        healthy,
        proxy_key: config.proxy_key.clone().map(Arc::new),
    };

    Ok(Services {
        state,
        audit,
        settings,
        authority: RemoteAuthority::new(connector),
    })
}

impl Services {
    /// Check the account credentials against the remote authority.
    ///
    /// Only warns; the gateway still serves key and health endpoints when
    /// credentials are rejected.
    pub fn verify_credentials(&self) -> bool {
        let Some(credentials) = self.settings.credentials() else {
            warn!("account credentials not configured");
            return false;
        };

        match self.authority.verify_account(&credentials) {
            Ok(_) => {
                info!(account_id = %credentials.account_id, "account credentials verified");
                true
            }
            Err(e) => {
                warn!(
                    account_id = %credentials.account_id,
                    code = e.code(),
                    error = %e,
                    "account credentials rejected"
                );
                false
            }
        }
    }
}
