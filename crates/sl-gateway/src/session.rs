//! Actor identity forwarded by the helpdesk session proxy.
//!
//! The proxy authenticates the support agent and passes who they are in
//! `X-TL-Actor-*` headers. Those headers are only believed when the request
//! also carries the shared proxy key; anything else is anonymous.

use axum::http::HeaderMap;
use sl_crypto::constant_time_compare;
use sl_handshake::Actor;
use tracing::warn;

pub const PROXY_KEY_HEADER: &str = "x-tl-proxy-key";
pub const ACTOR_ID_HEADER: &str = "x-tl-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-tl-actor-name";
pub const ACTOR_ROLES_HEADER: &str = "x-tl-actor-roles";

/// Resolve the acting user for one request.
pub fn actor_from_headers(headers: &HeaderMap, proxy_key: Option<&str>) -> Actor {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim);

    let Some(presented) = header(PROXY_KEY_HEADER) else {
        return Actor::anonymous();
    };
    let Some(expected) = proxy_key else {
        warn!("actor headers received but no proxy key is configured");
        return Actor::anonymous();
    };
    if !constant_time_compare(expected, presented) {
        warn!("proxy key mismatch, treating request as anonymous");
        return Actor::anonymous();
    }

    let Some(id) = header(ACTOR_ID_HEADER).and_then(|v| v.parse::<u64>().ok()) else {
        return Actor::anonymous();
    };
    let name = header(ACTOR_NAME_HEADER).unwrap_or_default();
    let roles = header(ACTOR_ROLES_HEADER)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty());

    Actor::new(id, name, roles)
}
