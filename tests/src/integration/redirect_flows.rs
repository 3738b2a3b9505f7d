//! # Redirect Flows
//!
//! Access key → secret ids → envelopes → login redirect, with customer
//! sites sealing real envelopes and the vendor opening them.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_json::json;
    use sl_crypto::{sha256_hex, BoxKeyPair, Ed25519Signature};
    use sl_handshake::{
        AuditAction, HttpMethod, RedirectOutcome, RedirectRequest, RedirectStatus, RemoteError,
        TOKEN_HEADER,
    };
    use std::sync::Arc;

    const SITES_ENDPOINT: &str = "accounts/1234/sites/";

    fn envelope_endpoint(secret_id: &str) -> String {
        format!("sites/{secret_id}/get-envelope")
    }

    fn actions(audit: &sl_handshake::adapters::InMemoryAuditLog, site: &str) -> Vec<AuditAction> {
        let mut entries = audit.recent(usize::MAX);
        entries.reverse();
        entries
            .into_iter()
            .filter(|e| e.site_id == site)
            .map(|e| e.action)
            .collect()
    }

    // =========================================================================
    // SINGLE DESTINATION
    // =========================================================================

    #[test]
    fn test_single_secret_id_redirects_to_login_url() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })))
            .respond(&envelope_endpoint("S1"), Ok(site.envelope_for(&vendor_box_public_key())));
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

        let outcome = orchestrator.handle(&access_key_request("AK1"), &admin());

        match outcome {
            RedirectOutcome::Redirect(redirect) => {
                assert_eq!(redirect.status, RedirectStatus::Success);
                assert_eq!(redirect.location, site.login_url());
            }
            other => panic!("expected redirect, got {other:?}"),
        }
        assert_eq!(
            actions(&audit, "S1"),
            vec![AuditAction::Requested, AuditAction::Received, AuditAction::Redirected]
        );
        assert!(audit
            .recent(usize::MAX)
            .iter()
            .all(|e| e.actor_user_id == 7));
    }

    #[test]
    fn test_wire_contract_of_both_calls() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })))
            .respond(&envelope_endpoint("S1"), Ok(site.envelope_for(&vendor_box_public_key())));
        let (orchestrator, _audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

        orchestrator.handle(&access_key_request("AK1"), &admin());

        // Access key lookup: POST, bearer auth, no token header
        let lookup = &authority.calls_to(SITES_ENDPOINT)[0];
        assert_eq!(lookup.method, HttpMethod::Post);
        assert_eq!(lookup.auth, "auth-key");
        assert_eq!(lookup.payload, json!({ "accessKeys": ["AK1"] }));
        assert!(!lookup.headers.contains_key(TOKEN_HEADER));

        // Envelope request: token header plus a nonce signed by the vendor
        let fetch = &authority.calls_to(&envelope_endpoint("S1"))[0];
        assert_eq!(fetch.method, HttpMethod::Post);
        assert_eq!(
            fetch.headers.get(TOKEN_HEADER),
            Some(&sha256_hex(&[b"pub-key".as_slice(), b"auth-key".as_slice()]))
        );
        assert_eq!(fetch.payload["user"], json!({ "id": 7, "name": "Agent Smith" }));

        let nonce = fetch.payload["nonce"].as_str().unwrap();
        assert_eq!(BASE64.decode(nonce).unwrap().len(), 32);
        let signed =
            Ed25519Signature::from_base64(fetch.payload["signedNonce"].as_str().unwrap()).unwrap();
        assert!(vendor_verifying_key().verify_nonce(nonce, &signed).is_ok());
    }

    #[test]
    fn test_envelope_for_another_vendor_falls_back() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        let stranger = BoxKeyPair::generate().public_key();
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })))
            .respond(&envelope_endpoint("S1"), Ok(site.envelope_for(&stranger)));
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority);

        let outcome = orchestrator.handle(&access_key_request("AK1"), &admin());

        match outcome {
            RedirectOutcome::Redirect(redirect) => {
                assert_eq!(redirect.status, RedirectStatus::Error);
                assert_eq!(redirect.location, "https://vendor.example");
            }
            other => panic!("expected fallback redirect, got {other:?}"),
        }
        assert_eq!(
            actions(&audit, "S1"),
            vec![AuditAction::Requested, AuditAction::Received, AuditAction::Failed]
        );
    }

    #[test]
    fn test_fallback_returns_to_admin_page() {
        let authority = ScriptedAuthority::new();
        authority.respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })));
        let (orchestrator, _audit) = orchestrator(Arc::new(vendor_settings()), authority);

        let request = RedirectRequest::from_pairs([
            ("trustedlogin", "1"),
            ("action", "accesskey_login"),
            ("provider", "helpscout"),
            ("ak", "AK1"),
            ("page", "support-tools"),
        ]);

        match orchestrator.handle(&request, &admin()) {
            RedirectOutcome::Redirect(redirect) => {
                assert_eq!(redirect.status, RedirectStatus::Error);
                assert_eq!(
                    redirect.location,
                    "https://vendor.example/wp-admin/admin.php?page=support-tools"
                );
            }
            other => panic!("expected fallback redirect, got {other:?}"),
        }
    }

    // =========================================================================
    // MULTIPLE DESTINATIONS
    // =========================================================================

    #[test]
    fn test_multiple_ids_offer_the_sites_that_opened() {
        let first = CustomerSite::new("https://one.example", "aaaa1111");
        let second = CustomerSite::new("https://two.example", "bbbb2222");
        let stranger = BoxKeyPair::generate().public_key();
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1", "S2"] })))
            .respond(&envelope_endpoint("S1"), Ok(first.envelope_for(&vendor_box_public_key())))
            .respond(&envelope_endpoint("S2"), Ok(second.envelope_for(&stranger)));
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority);

        let outcome = orchestrator.handle(&access_key_request("AK1"), &admin());

        let RedirectOutcome::ChooseSite(links) = outcome else {
            panic!("expected a site choice");
        };
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].site_url, "https://one.example");
        assert_eq!(links[0].login_url.as_str(), first.login_url());

        assert_eq!(
            actions(&audit, "S1"),
            vec![AuditAction::Requested, AuditAction::Received]
        );
        assert_eq!(
            actions(&audit, "S2"),
            vec![AuditAction::Requested, AuditAction::Received, AuditAction::Failed]
        );
    }

    #[test]
    fn test_remote_failure_note_is_kept_verbatim() {
        let first = CustomerSite::new("https://one.example", "aaaa1111");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1", "S2"] })))
            .respond(&envelope_endpoint("S1"), Ok(first.envelope_for(&vendor_box_public_key())))
            .respond(
                &envelope_endpoint("S2"),
                Err(RemoteError::Status {
                    status: 404,
                    message: "Site not found".into(),
                }),
            );
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority);

        orchestrator.handle(&access_key_request("AK1"), &admin());

        let received = audit
            .recent(usize::MAX)
            .into_iter()
            .find(|e| e.site_id == "S2" && e.action == AuditAction::Received)
            .unwrap();
        assert_eq!(
            received.note.as_deref(),
            Some("Failed: Remote authority returned 404: Site not found")
        );
        assert_eq!(actions(&audit, "S2").last(), Some(&AuditAction::Failed));
    }

    #[test]
    fn test_multiple_ids_all_failing_is_noop() {
        let authority = ScriptedAuthority::new();
        authority.respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1", "S2"] })));
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority);

        assert_eq!(
            orchestrator.handle(&access_key_request("AK1"), &admin()),
            RedirectOutcome::NoOp
        );
        assert_eq!(actions(&audit, "S1").last(), Some(&AuditAction::Failed));
        assert_eq!(actions(&audit, "S2").last(), Some(&AuditAction::Failed));
    }

    // =========================================================================
    // DECLINED REQUESTS
    // =========================================================================

    #[test]
    fn test_zero_ids_is_noop_without_envelope_fetch() {
        let authority = ScriptedAuthority::new();
        authority.respond(SITES_ENDPOINT, Ok(json!({ "AK1": [] })));
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

        assert_eq!(
            orchestrator.handle(&access_key_request("AK1"), &admin()),
            RedirectOutcome::NoOp
        );
        assert_eq!(authority.calls().len(), 1);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_unauthorized_actor_never_fetches_envelopes() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        for ids in [json!({ "AK1": ["S1"] }), json!({ "AK1": ["S1", "S2"] })] {
            let authority = ScriptedAuthority::new();
            authority
                .respond(SITES_ENDPOINT, Ok(ids))
                .respond(&envelope_endpoint("S1"), Ok(site.envelope_for(&vendor_box_public_key())));
            let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

            assert_eq!(
                orchestrator.handle(&access_key_request("AK1"), &subscriber()),
                RedirectOutcome::NoOp
            );
            assert!(authority.calls_to(&envelope_endpoint("S1")).is_empty());
            assert!(audit.is_empty());
        }
    }

    #[test]
    fn test_missing_access_key_makes_no_calls() {
        let authority = ScriptedAuthority::new();
        let (orchestrator, audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

        for action in ["accesskey_login", "support_redirect"] {
            let request = RedirectRequest::from_pairs([
                ("trustedlogin", "1"),
                ("action", action),
                ("provider", "helpscout"),
            ]);
            assert_eq!(orchestrator.handle(&request, &admin()), RedirectOutcome::NoOp);
        }
        assert!(authority.calls().is_empty());
        assert!(audit.is_empty());
    }

    #[test]
    fn test_other_helpdesk_is_ignored() {
        let authority = ScriptedAuthority::new();
        let (orchestrator, _audit) = orchestrator(Arc::new(vendor_settings()), authority.clone());

        let request = RedirectRequest::from_pairs([
            ("trustedlogin", "1"),
            ("action", "accesskey_login"),
            ("provider", "zendesk"),
            ("ak", "AK1"),
        ]);

        assert_eq!(orchestrator.handle(&request, &admin()), RedirectOutcome::NoOp);
        assert!(authority.calls().is_empty());
    }

    #[test]
    fn test_missing_credentials_is_noop() {
        let mut settings = vendor_settings();
        settings.account_id.clear();
        let authority = ScriptedAuthority::new();
        let (orchestrator, audit) = orchestrator(Arc::new(settings), authority.clone());

        assert_eq!(
            orchestrator.handle(&access_key_request("AK1"), &admin()),
            RedirectOutcome::NoOp
        );
        assert!(authority.calls().is_empty());
        assert!(audit.is_empty());
    }
}
