//! # Service Layer
//!
//! Application services implementing the inbound ports on top of the
//! domain logic and the outbound ports.

pub mod authority;
pub mod cache;
pub mod redirect;
pub mod webhook;

pub use authority::{KeySecrets, RemoteAuthority};
pub use cache::TtlCache;
pub use redirect::RedirectOrchestrator;
pub use webhook::WebhookHandler;
