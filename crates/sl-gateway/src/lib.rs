//! # SL Gateway
//!
//! HTTP boundary for the support login handshake.
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/?trustedlogin=1&action=..&provider=..&ak=..` | Support redirect |
//! | `POST` | `/webhook/helpscout` | Helpdesk widget data |
//! | `GET` | `/trustedlogin/v1/public_key` | Sealed box public key |
//! | `GET` | `/trustedlogin/v1/signature_key` | Identity verifying key |
//! | `GET` | `/trustedlogin/v1/healthcheck` | Readiness |
//!
//! ## Actor identity
//!
//! The gateway does not authenticate agents itself. A session proxy in
//! front of it forwards the agent in `X-TL-Actor-*` headers together with
//! the shared proxy key (see [`session`]).

pub mod config;
pub mod error;
pub mod router;
pub mod session;
pub mod wiring;

pub use config::{load_config, GatewayConfig, GatewayConfigError};
pub use error::GatewayError;
pub use router::{build_router, AppState, PublishedKeys};
pub use session::actor_from_headers;
pub use wiring::{build_services, Services};
