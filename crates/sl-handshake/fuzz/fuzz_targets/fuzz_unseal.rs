//! Fuzz target for envelope unsealing.
//!
//! Feeds arbitrary JSON-ish envelopes to the real sealed box cipher. The
//! unsealer must reject, never panic.
//!
//! ## Running
//!
//! ```bash
//! cd crates/sl-handshake
//! cargo +nightly fuzz run fuzz_unseal
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sl_crypto::BoxKeyPair;
use sl_handshake::adapters::SealedBoxCipher;
use sl_handshake::{Envelope, EnvelopeUnsealer};

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    identifier: Option<String>,
    site_url: Option<String>,
    public_key: Option<String>,
    nonce: Option<String>,
    raw: Option<Vec<u8>>,
}

fuzz_target!(|input: FuzzInput| {
    let unsealer = EnvelopeUnsealer::new(SealedBoxCipher::new(BoxKeyPair::from_secret_bytes([7u8; 32])));

    if let Some(raw) = input.raw {
        if let Ok(value) = serde_json::from_slice(&raw) {
            let _ = unsealer.unseal(Envelope::from_value(value));
        }
        return;
    }

    let mut object = serde_json::Map::new();
    for (key, value) in [
        ("identifier", input.identifier),
        ("siteUrl", input.site_url),
        ("publicKey", input.public_key),
        ("nonce", input.nonce),
    ] {
        if let Some(value) = value {
            object.insert(key.to_owned(), serde_json::Value::String(value));
        }
    }
    let _ = unsealer.unseal_parts(Envelope::from_value(serde_json::Value::Object(object)));
});
