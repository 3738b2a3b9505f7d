//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod audit;
pub mod cipher;
pub mod http;
pub mod licenses;

pub use audit::InMemoryAuditLog;
pub use cipher::SealedBoxCipher;
pub use http::{HttpAuthorityClient, HttpAuthorityConnector};
pub use licenses::StaticLicenseSource;
