//! Gateway errors and their HTTP rendering.

use crate::config::GatewayConfigError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sl_handshake::{ConfigError, HandshakeError, RemoteError};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Config(#[from] GatewayConfigError),

    #[error("invalid key material: {0}")]
    Keys(#[from] ConfigError),

    #[error("remote authority client unavailable: {0}")]
    Remote(#[from] RemoteError),

    #[error("license table {path}: {reason}")]
    Licenses { path: String, reason: String },

    /// Requested key material is not configured
    #[error("{0} is not configured")]
    KeyUnavailable(&'static str),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Handshake(e) => match e {
                HandshakeError::SignatureInvalid => StatusCode::UNAUTHORIZED,
                HandshakeError::DataError(_) | HandshakeError::MalformedEnvelope(_) => {
                    StatusCode::BAD_REQUEST
                }
                HandshakeError::AuthError(_) => StatusCode::FORBIDDEN,
                HandshakeError::RemoteError(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GatewayError::KeyUnavailable(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Handshake(e) => e.code(),
            GatewayError::KeyUnavailable(_) => "not-configured",
            _ => "gateway-error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.code(), error = %self, "request failed");
        }

        let body = match &self {
            // Say nothing about why a signature did not verify
            GatewayError::Handshake(HandshakeError::SignatureInvalid) => {
                json!({ "message": "Unauthorized" })
            }
            other => json!({ "code": other.code(), "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
