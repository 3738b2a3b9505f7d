//! # Remote Authority Requests
//!
//! Wire-level requests to the remote authority. Preconditions and audit
//! writes are the caller's business; this layer only builds clients,
//! attaches the token header and decodes responses.

use crate::config::AccountCredentials;
use crate::domain::entities::{AccessKey, Envelope, SecretId};
use crate::domain::errors::HandshakeError;
use crate::domain::signature::{auth_token, TOKEN_HEADER};
use crate::ports::outbound::{AuthorityClient, AuthorityConnector, HttpMethod, RemoteError};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Secret ids returned for one access key, in response order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySecrets {
    pub access_key: String,
    pub secret_ids: Vec<SecretId>,
}

pub struct RemoteAuthority<C: AuthorityConnector> {
    connector: C,
}

impl<C: AuthorityConnector> RemoteAuthority<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Client bound to the account auth key.
    pub fn client(&self, credentials: &AccountCredentials<'_>) -> C::Client {
        self.connector.connect(credentials.private_key)
    }

    /// Client that also carries `X-TL-TOKEN`.
    ///
    /// # Errors
    /// `TokenHeader` if the token cannot be derived or attached.
    pub fn token_client(
        &self,
        credentials: &AccountCredentials<'_>,
    ) -> Result<C::Client, HandshakeError> {
        let token = auth_token(credentials)?;
        let mut client = self.client(credentials);
        if !client.set_header(TOKEN_HEADER, &token) {
            warn!("Error setting X-TL-TOKEN header");
            return Err(HandshakeError::TokenHeader);
        }
        Ok(client)
    }

    /// `POST sites/{secret_id}/get-envelope`.
    pub fn get_envelope(
        &self,
        client: &C::Client,
        secret_id: &SecretId,
        payload: &Value,
    ) -> Result<Envelope, RemoteError> {
        let endpoint = format!("sites/{secret_id}/get-envelope");
        let response = client.call(&endpoint, payload, HttpMethod::Post)?;
        if response.is_null() {
            return Err(RemoteError::Decode("empty envelope".into()));
        }
        Ok(Envelope::from_value(response))
    }

    /// `accounts/{account_id}/sites/` with `{accessKeys: [...]}`.
    ///
    /// The redirect path POSTs a single key; the webhook GETs every license
    /// key at once.
    pub fn sites_for_keys(
        &self,
        client: &C::Client,
        account_id: &str,
        keys: &[AccessKey],
        method: HttpMethod,
    ) -> Result<Vec<KeySecrets>, RemoteError> {
        let endpoint = format!("accounts/{account_id}/sites/");
        let payload = json!({ "accessKeys": keys });
        let response = client.call(&endpoint, &payload, method)?;
        debug!(keys = keys.len(), "access keys resolved");
        Ok(group_secrets(response))
    }

    /// `GET accounts/{account_id}` with the derived token.
    pub fn verify_account(&self, credentials: &AccountCredentials<'_>) -> Result<Value, HandshakeError> {
        let client = self.token_client(credentials)?;
        let endpoint = format!("accounts/{}", credentials.account_id);
        Ok(client.call(&endpoint, &Value::Null, HttpMethod::Get)?)
    }
}

/// Flatten `{key: [secret, ..], ..}` (or a bare list) into groups.
///
/// Values that are neither strings nor lists of strings are skipped.
fn group_secrets(response: Value) -> Vec<KeySecrets> {
    let ids = |value: Value| -> Vec<SecretId> {
        match value {
            Value::String(s) if !s.is_empty() => vec![SecretId::new(s)],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.is_empty() => Some(SecretId::new(s)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    };

    match response {
        Value::Object(map) => map
            .into_iter()
            .map(|(access_key, secrets)| KeySecrets {
                access_key,
                secret_ids: ids(secrets),
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .map(|secrets| KeySecrets {
                access_key: String::new(),
                secret_ids: ids(secrets),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// All secret ids in response order.
pub fn flatten(groups: Vec<KeySecrets>) -> Vec<SecretId> {
    groups.into_iter().flat_map(|g| g.secret_ids).collect()
}
