//! Routes and handlers.
//!
//! The handshake core is synchronous (blocking HTTP to the remote
//! authority), so every call into it runs on the blocking pool.

use crate::error::GatewayError;
use crate::session::actor_from_headers;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use sl_handshake::{
    RedirectApi, RedirectOutcome, RedirectRequest, SiteLink, WebhookApi, WidgetResponse,
    WEBHOOK_SIGNATURE_HEADER,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;
use zeroize::Zeroizing;

/// Largest webhook body accepted.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const CHOOSE_SITE_MESSAGE: &str = "Please pick a site to log into.";

/// Public halves of the vendor key material, hex encoded.
#[derive(Clone, Debug, Default)]
pub struct PublishedKeys {
    pub public_key: Option<String>,
    pub signature_key: Option<String>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redirect: Arc<dyn RedirectApi>,
    pub webhook: Arc<dyn WebhookApi>,
    pub keys: PublishedKeys,
    /// Settings validated and all key material present
    pub healthy: bool,
    pub proxy_key: Option<Arc<Zeroizing<String>>>,
}

#[derive(Serialize)]
struct ChooseSite<'a> {
    message: &'a str,
    sites: Vec<SiteLink>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_redirect))
        .route("/webhook/helpscout", post(handle_helpscout_webhook))
        .route("/trustedlogin/v1/public_key", get(public_key))
        .route("/trustedlogin/v1/signature_key", get(signature_key))
        .route("/trustedlogin/v1/healthcheck", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_redirect(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let actor = actor_from_headers(&headers, state.proxy_key.as_deref().map(|k| k.as_str()));
    let request = RedirectRequest::from_pairs(params);
    let api = Arc::clone(&state.redirect);

    let outcome = tokio::task::spawn_blocking(move || api.handle_redirect(&request, &actor))
        .await
        .map_err(|e| GatewayError::Worker(e.to_string()))?;

    Ok(outcome_response(outcome))
}

fn outcome_response(outcome: RedirectOutcome) -> Response {
    match outcome {
        RedirectOutcome::Redirect(redirect) => {
            let status = StatusCode::from_u16(redirect.status.http_status())
                .unwrap_or(StatusCode::SEE_OTHER);
            (status, [(header::LOCATION, redirect.location)]).into_response()
        }
        RedirectOutcome::ChooseSite(sites) => {
            debug!(count = sites.len(), "asking actor to pick a site");
            Json(ChooseSite {
                message: CHOOSE_SITE_MESSAGE,
                sites,
            })
            .into_response()
        }
        RedirectOutcome::NoOp => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn handle_helpscout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WidgetResponse>, GatewayError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let api = Arc::clone(&state.webhook);

    let widget = tokio::task::spawn_blocking(move || api.handle_webhook(&body, signature.as_deref()))
        .await
        .map_err(|e| GatewayError::Worker(e.to_string()))??;

    Ok(Json(widget))
}

async fn public_key(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let key = state
        .keys
        .public_key
        .ok_or(GatewayError::KeyUnavailable("sealed box key"))?;
    Ok(Json(json!({ "publicKey": key })))
}

async fn signature_key(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let key = state
        .keys
        .signature_key
        .ok_or(GatewayError::KeyUnavailable("signing key"))?;
    Ok(Json(json!({ "signatureKey": key })))
}

async fn health_check(State(state): State<AppState>) -> StatusCode {
    if state.healthy {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::FAILED_DEPENDENCY
    }
}
