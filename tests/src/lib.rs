//! # Support-Login Test Suite
//!
//! Cross-crate scenarios run against real key material: customer sites seal
//! envelopes with X25519, the vendor signs identity nonces with Ed25519, and
//! only the remote authority is scripted.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Customer sites, vendor keys, scripted authority
//! └── integration/
//!     ├── redirect_flows.rs   # Access key → envelope → redirect
//!     ├── webhook_flows.rs    # Helpdesk webhook → widget items
//!     └── gateway_flows.rs    # Same flows through the HTTP router
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sl-tests
//! cargo test -p sl-tests integration::webhook_flows
//! cargo bench -p sl-tests
//! ```

pub mod fixtures;
pub mod integration;
