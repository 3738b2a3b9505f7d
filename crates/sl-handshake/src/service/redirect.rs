//! # Redirect Orchestrator
//!
//! The support redirect protocol:
//!
//! ```text
//! Idle ──parse──→ ParsedRequest ──┬─ accesskey_login ─→ ResolvingAccessKey ─┐
//!                                 └─ support_redirect ─→ HavingSecretId ─────┤
//!                                                                            ↓
//!                              Failed ←──── AwaitingEnvelope ──→ Unsealed ──→ Redirecting
//! ```
//!
//! Parse, resolution and authorization failures end the request silently
//! ([`RedirectOutcome::NoOp`]). Once an envelope has been requested, the
//! request always ends in a redirect: to the login URL on success, to the
//! fallback URL otherwise. Every envelope request is bracketed by audit
//! writes.

use crate::config::VendorSettings;
use crate::domain::entities::{
    AccessKey, AuditAction, Envelope, Redirect, RedirectOutcome, RedirectStatus, SecretId,
    SiteLink,
};
use crate::domain::envelope::EnvelopeUnsealer;
use crate::domain::errors::HandshakeError;
use crate::domain::identity::IdentityProofBuilder;
use crate::domain::request::{ParsedRequest, RedirectAction, RedirectRequest, RequestSkip};
use crate::ports::inbound::RedirectApi;
use crate::ports::outbound::{ActorSession, AuditLog, AuthorityConnector, EnvelopeCipher, HttpMethod};
use crate::service::authority::{flatten, RemoteAuthority};
use reqwest::Url;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit note for a completed step.
const NOTE_SUCCESS: &str = "Successful";

pub struct RedirectOrchestrator<C, X, A>
where
    C: AuthorityConnector,
    X: EnvelopeCipher,
    A: AuditLog,
{
    settings: Arc<VendorSettings>,
    authority: RemoteAuthority<C>,
    identity: IdentityProofBuilder,
    unsealer: EnvelopeUnsealer<X>,
    audit: A,
}

impl<C, X, A> RedirectOrchestrator<C, X, A>
where
    C: AuthorityConnector,
    X: EnvelopeCipher,
    A: AuditLog,
{
    pub fn new(
        settings: Arc<VendorSettings>,
        connector: C,
        identity: IdentityProofBuilder,
        cipher: X,
        audit: A,
    ) -> Self {
        Self {
            settings,
            authority: RemoteAuthority::new(connector),
            identity,
            unsealer: EnvelopeUnsealer::new(cipher),
            audit,
        }
    }

    /// Entry point for one inbound request.
    pub fn handle(&self, request: &RedirectRequest, actor: &dyn ActorSession) -> RedirectOutcome {
        let parsed = match request.parse() {
            Ok(parsed) => parsed,
            Err(RequestSkip::NotTriggered) => return RedirectOutcome::NoOp,
            Err(skip) => {
                debug!(reason = %skip, "redirect request ignored");
                return RedirectOutcome::NoOp;
            }
        };

        let helpdesk = self.settings.active_helpdesk();
        if parsed.provider != helpdesk {
            debug!(
                helpdesk,
                provider = %parsed.provider,
                "Active helpdesk doesn't match passed provider"
            );
            return RedirectOutcome::NoOp;
        }

        self.dispatch(&parsed, actor)
    }

    fn dispatch(&self, parsed: &ParsedRequest, actor: &dyn ActorSession) -> RedirectOutcome {
        let page = parsed.page.as_deref();
        match &parsed.action {
            RedirectAction::AccessKeyLogin => {
                let access_key = AccessKey::new(parsed.ak.as_str());
                let secret_ids = match self.api_get_secret_ids(&access_key, actor) {
                    Ok(ids) => ids,
                    Err(e) => {
                        debug!(error = %e, "Could not get secret ids");
                        return RedirectOutcome::NoOp;
                    }
                };

                match secret_ids.as_slice() {
                    [] => {
                        debug!(access_key = %parsed.ak, "No secret ids returned for access key");
                        RedirectOutcome::NoOp
                    }
                    [only] => {
                        // A declined single redirect is not retried as a site list.
                        let outcome = self.maybe_redirect_support(only, None, page, actor);
                        if outcome == RedirectOutcome::NoOp {
                            debug!(secret_id = %only, "single secret id declined");
                        }
                        outcome
                    }
                    many => self.handle_multiple_secret_ids(many, actor),
                }
            }
            RedirectAction::SupportRedirect => {
                let secret_id = SecretId::new(parsed.ak.as_str());
                self.maybe_redirect_support(&secret_id, None, page, actor)
            }
            RedirectAction::Other(action) => {
                debug!(action = %action, "unknown redirect action");
                RedirectOutcome::NoOp
            }
        }
    }

    /// Redirect the actor into the destination behind `secret_id`.
    ///
    /// Pass `envelope` when it has already been fetched.
    pub fn maybe_redirect_support(
        &self,
        secret_id: &SecretId,
        envelope: Option<Envelope>,
        page: Option<&str>,
        actor: &dyn ActorSession,
    ) -> RedirectOutcome {
        debug!(secret_id = %secret_id, "maybe_redirect_support");

        let fallback = self.fallback_url(page);

        if !self.auth_verify_user(actor) {
            debug!("User cannot be redirected.");
            return RedirectOutcome::NoOp;
        }

        let actor_id = actor.current_actor_id();
        let envelope = match envelope {
            Some(envelope) => Ok(envelope),
            None => self.api_get_envelope(secret_id, actor),
        };

        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(secret_id = %secret_id, code = e.code(), "envelope fetch failed");
                self.audit
                    .append(secret_id.as_str(), AuditAction::Failed, actor_id, Some(e.to_string().as_str()));
                return redirect_to(fallback, RedirectStatus::Error);
            }
        };

        match self.unsealer.unseal(envelope) {
            Ok(login_url) => {
                self.audit.append(
                    secret_id.as_str(),
                    AuditAction::Redirected,
                    actor_id,
                    Some(NOTE_SUCCESS),
                );
                info!(secret_id = %secret_id, "redirecting support agent");
                redirect_to(login_url.into_string(), RedirectStatus::Success)
            }
            Err(e) => {
                warn!(secret_id = %secret_id, code = e.code(), "envelope unseal failed");
                self.audit
                    .append(secret_id.as_str(), AuditAction::Failed, actor_id, Some(e.to_string().as_str()));
                redirect_to(fallback, RedirectStatus::Error)
            }
        }
    }

    /// Fetch and unseal every candidate; failures are audited and skipped.
    pub fn handle_multiple_secret_ids(
        &self,
        secret_ids: &[SecretId],
        actor: &dyn ActorSession,
    ) -> RedirectOutcome {
        if secret_ids.is_empty() {
            return RedirectOutcome::NoOp;
        }
        if !self.auth_verify_user(actor) {
            debug!("User cannot be redirected.");
            return RedirectOutcome::NoOp;
        }

        let actor_id = actor.current_actor_id();
        let mut links: Vec<SiteLink> = Vec::with_capacity(secret_ids.len());

        for secret_id in secret_ids {
            let result = self
                .api_get_envelope(secret_id, actor)
                .and_then(|envelope| self.unsealer.unseal_parts(envelope));

            match result {
                Ok(link) => links.push(link),
                Err(e) => {
                    debug!(secret_id = %secret_id, error = %e, "skipping candidate");
                    self.audit
                        .append(secret_id.as_str(), AuditAction::Failed, actor_id, Some(e.to_string().as_str()));
                }
            }
        }

        if links.is_empty() {
            return RedirectOutcome::NoOp;
        }
        info!(candidates = links.len(), "offering site choice");
        RedirectOutcome::ChooseSite(links)
    }

    /// Authenticated and holding at least one approved role.
    pub fn auth_verify_user(&self, actor: &dyn ActorSession) -> bool {
        if !actor.is_authenticated() {
            return false;
        }
        let roles = actor.current_actor_roles();
        self.settings
            .approved_roles()
            .iter()
            .any(|role| roles.contains(role))
    }

    /// Request the envelope for `secret_id`.
    ///
    /// Precondition failures return before any remote call or audit write.
    /// Otherwise `requested` is written before the call and `received`
    /// after it.
    pub fn api_get_envelope(
        &self,
        secret_id: &SecretId,
        actor: &dyn ActorSession,
    ) -> Result<Envelope, HandshakeError> {
        if secret_id.is_empty() {
            debug!("Error: secret_id cannot be empty.");
            return Err(HandshakeError::DataError("Site ID cannot be empty".into()));
        }
        if !actor.is_authenticated() {
            return Err(HandshakeError::not_logged_in());
        }
        let credentials = self.settings.credentials().ok_or_else(|| {
            debug!("no api_key, public_key or account_id provided");
            HandshakeError::missing_credentials()
        })?;

        let proof = self.identity.create_identity_nonce()?;
        let actor_id = actor.current_actor_id();
        let payload = json!({
            "user": { "id": actor_id, "name": actor.display_name() },
            "nonce": proof.nonce,
            "signedNonce": proof.signed_nonce,
        });

        self.audit
            .append(secret_id.as_str(), AuditAction::Requested, actor_id, None);

        let client = self.authority.token_client(&credentials)?;
        let result = self.authority.get_envelope(&client, secret_id, &payload);

        let note = match &result {
            Ok(_) => NOTE_SUCCESS.to_owned(),
            Err(e) => format!("Failed: {e}"),
        };
        self.audit
            .append(secret_id.as_str(), AuditAction::Received, actor_id, Some(note.as_str()));

        Ok(result?)
    }

    /// Resolve an access key to its secret ids.
    pub fn api_get_secret_ids(
        &self,
        access_key: &AccessKey,
        actor: &dyn ActorSession,
    ) -> Result<Vec<SecretId>, HandshakeError> {
        if access_key.is_empty() {
            debug!("Error: access_key cannot be empty.");
            return Err(HandshakeError::DataError("Access Key cannot be empty".into()));
        }
        if !actor.is_authenticated() {
            return Err(HandshakeError::not_logged_in());
        }
        let credentials = self.settings.credentials().ok_or_else(|| {
            debug!("no api_key, public_key or account_id provided");
            HandshakeError::missing_credentials()
        })?;

        let client = self.authority.client(&credentials);
        let groups = self.authority.sites_for_keys(
            &client,
            credentials.account_id,
            std::slice::from_ref(access_key),
            HttpMethod::Post,
        )?;
        Ok(flatten(groups))
    }

    /// Site root, or the admin page the request came from.
    fn fallback_url(&self, page: Option<&str>) -> String {
        let Some(page) = page else {
            return self.settings.site_url.clone();
        };
        let base = format!("{}/admin.php", self.settings.admin_url.trim_end_matches('/'));
        match Url::parse_with_params(&base, &[("page", page)]) {
            Ok(url) => url.to_string(),
            Err(_) => self.settings.site_url.clone(),
        }
    }
}

fn redirect_to(location: String, status: RedirectStatus) -> RedirectOutcome {
    RedirectOutcome::Redirect(Redirect { location, status })
}

impl<C, X, A> RedirectApi for RedirectOrchestrator<C, X, A>
where
    C: AuthorityConnector,
    X: EnvelopeCipher,
    A: AuditLog,
{
    fn handle_redirect(
        &self,
        request: &RedirectRequest,
        actor: &dyn ActorSession,
    ) -> RedirectOutcome {
        self.handle(request, actor)
    }
}
