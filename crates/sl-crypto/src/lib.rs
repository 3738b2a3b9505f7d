//! # SL Crypto - Handshake Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `mac` | HMAC-SHA1 (base64) | Inbound webhook signatures |
//! | `hashing` | SHA-256, MD5 | Outbound `X-TL-TOKEN`, login endpoint hash |
//! | `sealed_box` | X25519 + XSalsa20-Poly1305 | Envelope identifier decryption |
//! | `signatures` | Ed25519 | Identity nonce signing |
//!
//! ## Security Properties
//!
//! - **MAC comparison**: constant-time via `subtle`, length-oblivious
//! - **Sealed box**: authenticated; tampered ciphertext never yields plaintext
//! - **Key material**: secret keys are zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod mac;
pub mod sealed_box;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{endpoint_hash, md5_hex, sha256_hex, token_for};
pub use mac::{constant_time_compare, hmac_sha1_base64, KeyedDigest};
pub use sealed_box::{BoxKeyPair, BoxPublicKey, BOX_KEY_LEN, BOX_NONCE_LEN};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
