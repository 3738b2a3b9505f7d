//! HTTP client for the remote authority.
//!
//! Blocking by design: the core is synchronous and the HTTP boundary runs
//! it on the blocking pool. One call, one attempt; no retries.

use crate::ports::outbound::{AuthorityClient, AuthorityConnector, HttpMethod, RemoteError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds [`HttpAuthorityClient`]s sharing one connection pool.
#[derive(Clone)]
pub struct HttpAuthorityConnector {
    client: Client,
    base_url: String,
}

impl HttpAuthorityConnector {
    /// Must be called outside an async context.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl AuthorityConnector for HttpAuthorityConnector {
    type Client = HttpAuthorityClient;

    fn connect(&self, auth: &str) -> HttpAuthorityClient {
        HttpAuthorityClient {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth: auth.to_owned(),
            headers: HeaderMap::new(),
        }
    }
}

pub struct HttpAuthorityClient {
    client: Client,
    base_url: String,
    auth: String,
    headers: HeaderMap,
}

impl HttpAuthorityClient {
    fn url(&self, endpoint: &str) -> Result<Url, RemoteError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| RemoteError::Transport(format!("bad url {joined}: {e}")))
    }
}

impl AuthorityClient for HttpAuthorityClient {
    fn set_header(&mut self, name: &str, value: &str) -> bool {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            return false;
        };
        self.headers.insert(name, value);
        true
    }

    fn call(&self, endpoint: &str, payload: &Value, method: HttpMethod) -> Result<Value, RemoteError> {
        let mut url = self.url(endpoint)?;

        let request = match method {
            HttpMethod::Get => {
                append_query(&mut url, payload);
                self.client.get(url)
            }
            HttpMethod::Post => self.client.post(url).json(payload),
        };

        debug!(method = method.as_str(), endpoint, "remote authority call");
        let response = request
            .headers(self.headers.clone())
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.auth))
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned()),
            });
        }

        decode_body(&body)
    }
}

fn decode_body(body: &str) -> Result<Value, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// `message` or `error` field of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Encode a flat JSON object as query pairs; arrays use `key[]`.
fn append_query(url: &mut Url, payload: &Value) {
    let Some(object) = payload.as_object() else {
        return;
    };
    let mut pairs = url.query_pairs_mut();
    for (key, value) in object {
        match value {
            Value::Array(items) => {
                let name = format!("{key}[]");
                for item in items {
                    pairs.append_pair(&name, &scalar(item));
                }
            }
            Value::Null => {}
            other => {
                pairs.append_pair(key, &scalar(other));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
