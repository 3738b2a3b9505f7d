//! Fuzz target for helpdesk webhook verification.
//!
//! Arbitrary bodies, signatures and secrets must never panic, and a
//! signature only verifies when it is the real HMAC of the body.
//!
//! ## Running
//!
//! ```bash
//! cd crates/sl-handshake
//! cargo +nightly fuzz run fuzz_webhook_verify
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sl_crypto::hmac_sha1_base64;
use sl_handshake::domain::signature::verify_webhook;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    body: Vec<u8>,
    signature: Option<String>,
    secret: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let accepted = verify_webhook(&input.body, input.signature.as_deref(), &input.secret);

    if accepted {
        let expected = hmac_sha1_base64(&input.secret, &input.body).unwrap_or_default();
        assert!(!input.secret.is_empty());
        assert_eq!(input.signature.as_deref().map(str::trim), Some(expected.as_str()));
    }
});
