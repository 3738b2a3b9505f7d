//! # Inbound Ports (Driving Ports / API)
//!
//! What the boundary layer calls. Implementations must be thread-safe
//! (`Send + Sync`) so one instance can serve every request.

use crate::domain::entities::{RedirectOutcome, WidgetResponse};
use crate::domain::errors::HandshakeError;
use crate::domain::request::RedirectRequest;
use crate::ports::outbound::ActorSession;

/// Support redirect entry point.
pub trait RedirectApi: Send + Sync {
    /// Run the redirect protocol for one request.
    ///
    /// Resolution and authorization failures degrade to
    /// [`RedirectOutcome::NoOp`]; they are never surfaced as errors.
    fn handle_redirect(&self, request: &RedirectRequest, actor: &dyn ActorSession)
        -> RedirectOutcome;
}

/// Helpdesk webhook entry point.
pub trait WebhookApi: Send + Sync {
    /// Verify and answer a helpdesk push.
    ///
    /// # Errors
    /// * `SignatureInvalid` - body did not verify; nothing was parsed
    /// * `DataError` - verified body is not the expected JSON
    /// * `SetupError` - credentials are not configured
    /// * `RemoteError` - license resolution failed
    fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WidgetResponse, HandshakeError>;
}
