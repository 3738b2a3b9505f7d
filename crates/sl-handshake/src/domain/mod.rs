//! # Domain Layer
//!
//! Pure handshake logic. No I/O happens here; remote calls, decryption and
//! audit writes go through the ports.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod identity;
pub mod request;
pub mod signature;
