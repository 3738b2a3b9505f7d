//! # Helpdesk Webhook
//!
//! Answers the helpdesk sidebar widget: which of this customer's licenses
//! have an authorized support session, and where to click to use it.
//!
//! The body is authenticated before it is parsed. License lookups are
//! memoized per customer for a day, for a bounded number of customers;
//! empty results are never memoized.

use crate::config::VendorSettings;
use crate::domain::entities::{AccessKey, License, WidgetItem, WidgetResponse};
use crate::domain::errors::HandshakeError;
use crate::domain::request::{sanitize, REDIRECT_TRIGGER};
use crate::domain::signature::SignatureVerifier;
use crate::ports::inbound::WebhookApi;
use crate::ports::outbound::{AuthorityConnector, HttpMethod, LicenseSource};
use crate::service::authority::RemoteAuthority;
use crate::service::cache::TtlCache;
use serde::Deserialize;
use sl_crypto::md5_hex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message shown when no session is authorized.
pub const NO_SESSIONS_MESSAGE: &str = "No TrustedLogin sessions authorized for this user.";

#[derive(Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    customer: Option<Customer>,
}

#[derive(Deserialize)]
struct Customer {
    #[serde(default)]
    email: Option<String>,
}

pub struct WebhookHandler<C: AuthorityConnector, L: LicenseSource> {
    settings: Arc<VendorSettings>,
    authority: RemoteAuthority<C>,
    verifier: SignatureVerifier,
    licenses: L,
    cache: TtlCache<String, Vec<License>>,
}

impl<C: AuthorityConnector, L: LicenseSource> WebhookHandler<C, L> {
    pub fn new(settings: Arc<VendorSettings>, connector: C, licenses: L) -> Self {
        let verifier = SignatureVerifier::new(settings.helpscout_secret.as_bytes());
        Self {
            settings,
            authority: RemoteAuthority::new(connector),
            verifier,
            licenses,
            cache: TtlCache::default(),
        }
    }

    /// Licenses for `email`, memoized under `md5(email)`.
    pub fn licenses_for(&self, email: &str) -> Result<Vec<License>, HandshakeError> {
        let cache_key = md5_hex(email.as_bytes());
        if let Some(hit) = self.cache.get(&cache_key) {
            debug!(cache_key = %cache_key, "license cache hit");
            return Ok(hit);
        }
        if email.is_empty() {
            return Ok(Vec::new());
        }

        let licenses = self.licenses.licenses_for(email)?;
        if !licenses.is_empty() {
            self.cache.insert(cache_key, licenses.clone());
        }
        Ok(licenses)
    }

    fn process(&self, body: &[u8], signature: Option<&str>) -> Result<WidgetResponse, HandshakeError> {
        if !self.verifier.verify(body, signature) {
            warn!("webhook signature rejected");
            return Err(HandshakeError::SignatureInvalid);
        }

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|e| HandshakeError::DataError(format!("Invalid webhook payload: {e}")))?;
        let email = payload
            .customer
            .and_then(|c| c.email)
            .map(|e| sanitize(&e))
            .unwrap_or_default();

        let licenses = self.licenses_for(&email)?;

        let credentials = self.settings.credentials().ok_or_else(|| {
            let message = "Please make sure the TrustedLogin API Key setting is entered.";
            debug!(message);
            HandshakeError::SetupError(message.into())
        })?;
        let client = self.authority.token_client(&credentials)?;

        if licenses.is_empty() {
            return Ok(empty_widget());
        }

        let statuses: HashMap<&str, &str> = licenses
            .iter()
            .map(|l| (l.key.as_str(), l.status.as_str()))
            .collect();
        let keys: Vec<AccessKey> = licenses.iter().map(|l| AccessKey::new(l.key.as_str())).collect();

        let groups = self.authority.sites_for_keys(
            &client,
            credentials.account_id,
            &keys,
            HttpMethod::Get,
        )?;

        let site_url = self.settings.site_url.trim_end_matches('/');
        let items: Vec<WidgetItem> = groups
            .iter()
            .flat_map(|group| {
                let status = statuses
                    .get(group.access_key.as_str())
                    .copied()
                    .unwrap_or_default();
                group.secret_ids.iter().map(move |secret| WidgetItem {
                    license_key: group.access_key.clone(),
                    status: status.to_owned(),
                    url: format!("{site_url}/{REDIRECT_TRIGGER}/{secret}"),
                })
            })
            .collect();

        info!(items = items.len(), "webhook answered");
        if items.is_empty() {
            return Ok(empty_widget());
        }
        Ok(WidgetResponse {
            items,
            message: None,
        })
    }
}

fn empty_widget() -> WidgetResponse {
    WidgetResponse {
        items: Vec::new(),
        message: Some(NO_SESSIONS_MESSAGE.to_owned()),
    }
}

impl<C: AuthorityConnector, L: LicenseSource> WebhookApi for WebhookHandler<C, L> {
    fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WidgetResponse, HandshakeError> {
        self.process(body, signature)
    }
}
