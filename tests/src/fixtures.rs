//! Shared scenario fixtures.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sl_crypto::sealed_box::generate_nonce;
use sl_crypto::{endpoint_hash, BoxKeyPair, BoxPublicKey, Ed25519KeyPair, Ed25519PublicKey};
use sl_handshake::adapters::{InMemoryAuditLog, SealedBoxCipher};
use sl_handshake::{
    Actor, AuthorityClient, AuthorityConnector, HttpMethod, IdentityProofBuilder,
    RedirectOrchestrator, RedirectRequest, RemoteError, VendorSettings,
};
use std::collections::HashMap;
use std::sync::Arc;
use zeroize::Zeroizing;

// =============================================================================
// Vendor
// =============================================================================

pub const VENDOR_BOX_SECRET: [u8; 32] = [0x11; 32];
pub const VENDOR_SIGN_SEED: [u8; 32] = [0x22; 32];
pub const WEBHOOK_SECRET: &str = "shh";

pub fn vendor_settings() -> VendorSettings {
    VendorSettings {
        account_id: "1234".into(),
        private_key: Zeroizing::new("auth-key".to_owned()),
        public_key: "pub-key".into(),
        site_url: "https://vendor.example".into(),
        admin_url: "https://vendor.example/wp-admin".into(),
        helpscout_secret: Zeroizing::new(WEBHOOK_SECRET.to_owned()),
        box_secret_key: Zeroizing::new(hex::encode(VENDOR_BOX_SECRET)),
        sign_secret_key: Zeroizing::new(hex::encode(VENDOR_SIGN_SEED)),
        ..Default::default()
    }
}

pub fn vendor_box_public_key() -> BoxPublicKey {
    BoxKeyPair::from_secret_bytes(VENDOR_BOX_SECRET).public_key()
}

pub fn vendor_verifying_key() -> Ed25519PublicKey {
    Ed25519KeyPair::from_seed(VENDOR_SIGN_SEED).public_key()
}

pub type Orchestrator = RedirectOrchestrator<ScriptedAuthority, SealedBoxCipher, Arc<InMemoryAuditLog>>;

/// Orchestrator with the vendor's real keys and an in-memory audit log.
pub fn orchestrator(
    settings: Arc<VendorSettings>,
    authority: ScriptedAuthority,
) -> (Orchestrator, Arc<InMemoryAuditLog>) {
    let box_keys = settings
        .box_keypair()
        .ok()
        .flatten()
        .unwrap_or_else(BoxKeyPair::generate);
    let identity = IdentityProofBuilder::from_key(settings.signing_keypair().ok().flatten());
    let audit = Arc::new(InMemoryAuditLog::new());

    let orchestrator = RedirectOrchestrator::new(
        settings,
        authority,
        identity,
        SealedBoxCipher::new(box_keys),
        Arc::clone(&audit),
    );
    (orchestrator, audit)
}

pub fn admin() -> Actor {
    Actor::new(7, "Agent Smith", ["administrator"])
}

pub fn subscriber() -> Actor {
    Actor::new(8, "Guest", ["subscriber"])
}

pub fn access_key_request(ak: &str) -> RedirectRequest {
    RedirectRequest::from_pairs([
        ("trustedlogin", "1"),
        ("action", "accesskey_login"),
        ("provider", "helpscout"),
        ("ak", ak),
    ])
}

// =============================================================================
// Customer sites
// =============================================================================

/// A customer installation that has granted access.
pub struct CustomerSite {
    pub site_url: String,
    identifier: String,
    keys: BoxKeyPair,
}

impl CustomerSite {
    pub fn new(site_url: &str, identifier: &str) -> Self {
        Self {
            site_url: site_url.to_owned(),
            identifier: identifier.to_owned(),
            keys: BoxKeyPair::generate(),
        }
    }

    /// Envelope as the remote authority relays it, sealed for `vendor`.
    pub fn envelope_for(&self, vendor: &BoxPublicKey) -> Value {
        let nonce = generate_nonce();
        let sealed = self
            .keys
            .seal(self.identifier.as_bytes(), &nonce, vendor)
            .unwrap_or_default();

        json!({
            "identifier": BASE64.encode(sealed),
            "siteUrl": self.site_url,
            "publicKey": self.keys.public_key().to_hex(),
            "nonce": hex::encode(nonce),
            "expiry": 1_900_000_000i64,
        })
    }

    /// The login URL the vendor should end up redirecting to.
    pub fn login_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.site_url,
            endpoint_hash(&self.site_url, &self.identifier),
            self.identifier
        )
    }
}

// =============================================================================
// Remote authority
// =============================================================================

#[derive(Clone, Debug)]
pub struct AuthorityCall {
    pub auth: String,
    pub endpoint: String,
    pub payload: Value,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
}

/// Remote authority answering from a script; unscripted endpoints are 404.
#[derive(Clone, Default)]
pub struct ScriptedAuthority {
    responses: Arc<Mutex<HashMap<String, Result<Value, RemoteError>>>>,
    calls: Arc<Mutex<Vec<AuthorityCall>>>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, response: Result<Value, RemoteError>) -> &Self {
        self.responses.lock().insert(endpoint.to_owned(), response);
        self
    }

    pub fn calls(&self) -> Vec<AuthorityCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<AuthorityCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }
}

pub struct ScriptedClient {
    authority: ScriptedAuthority,
    auth: String,
    headers: HashMap<String, String>,
}

impl AuthorityConnector for ScriptedAuthority {
    type Client = ScriptedClient;

    fn connect(&self, auth: &str) -> ScriptedClient {
        ScriptedClient {
            authority: self.clone(),
            auth: auth.to_owned(),
            headers: HashMap::new(),
        }
    }
}

impl AuthorityClient for ScriptedClient {
    fn set_header(&mut self, name: &str, value: &str) -> bool {
        self.headers.insert(name.to_owned(), value.to_owned());
        true
    }

    fn call(&self, endpoint: &str, payload: &Value, method: HttpMethod) -> Result<Value, RemoteError> {
        self.authority.calls.lock().push(AuthorityCall {
            auth: self.auth.clone(),
            endpoint: endpoint.to_owned(),
            payload: payload.clone(),
            method,
            headers: self.headers.clone(),
        });

        self.authority
            .responses
            .lock()
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| {
                Err(RemoteError::Status {
                    status: 404,
                    message: "Not found".into(),
                })
            })
    }
}
