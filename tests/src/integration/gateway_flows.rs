//! # Gateway Flows
//!
//! The redirect and webhook flows driven through the HTTP router, with the
//! session proxy headers deciding who the actor is.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use sl_crypto::hmac_sha1_base64;
    use sl_gateway::session::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLES_HEADER, PROXY_KEY_HEADER};
    use sl_gateway::{build_router, AppState, PublishedKeys};
    use sl_handshake::adapters::{InMemoryAuditLog, StaticLicenseSource};
    use sl_handshake::{WebhookHandler, WEBHOOK_SIGNATURE_HEADER};
    use std::sync::Arc;
    use tower::ServiceExt;
    use zeroize::Zeroizing;

    const SITES_ENDPOINT: &str = "accounts/1234/sites/";
    const REDIRECT_URI: &str = "/?trustedlogin=1&action=accesskey_login&provider=helpscout&ak=AK1";

    fn app(authority: &ScriptedAuthority) -> (axum::Router, Arc<InMemoryAuditLog>) {
        let settings = Arc::new(vendor_settings());
        let (redirect, audit) = orchestrator(Arc::clone(&settings), authority.clone());
        let licenses = StaticLicenseSource::from_json(
            r#"{"pat@example.com": [{"key": "LIC-1", "status": "active"}]}"#,
        )
        .unwrap();
        let webhook = WebhookHandler::new(settings, authority.clone(), licenses);

        let state = AppState {
            redirect: Arc::new(redirect),
            webhook: Arc::new(webhook),
            keys: PublishedKeys {
                public_key: Some(vendor_box_public_key().to_hex()),
                signature_key: Some(vendor_verifying_key().to_hex()),
            },
            healthy: true,
            proxy_key: Some(Arc::new(Zeroizing::new("proxy-secret".to_owned()))),
        };
        (build_router(state), audit)
    }

    fn as_agent(uri: &str, proxy_key: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(PROXY_KEY_HEADER, proxy_key)
            .header(ACTOR_ID_HEADER, "7")
            .header(ACTOR_NAME_HEADER, "Agent Smith")
            .header(ACTOR_ROLES_HEADER, "administrator")
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_agent_is_redirected_into_customer_site() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })))
            .respond("sites/S1/get-envelope", Ok(site.envelope_for(&vendor_box_public_key())));
        let (app, audit) = app(&authority);

        let response = app.oneshot(as_agent(REDIRECT_URI, "proxy-secret")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION].to_str().unwrap(),
            site.login_url()
        );
        assert_eq!(audit.len(), 3);
    }

    #[tokio::test]
    async fn test_forged_actor_headers_are_ignored() {
        let site = CustomerSite::new("https://customer.example", "f00dfeed");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1"] })))
            .respond("sites/S1/get-envelope", Ok(site.envelope_for(&vendor_box_public_key())));
        let (app, audit) = app(&authority);

        let response = app.oneshot(as_agent(REDIRECT_URI, "guessed")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(authority.calls().is_empty());
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn test_two_sites_return_a_choice() {
        let one = CustomerSite::new("https://one.example", "aaaa1111");
        let two = CustomerSite::new("https://two.example", "bbbb2222");
        let authority = ScriptedAuthority::new();
        authority
            .respond(SITES_ENDPOINT, Ok(json!({ "AK1": ["S1", "S2"] })))
            .respond("sites/S1/get-envelope", Ok(one.envelope_for(&vendor_box_public_key())))
            .respond("sites/S2/get-envelope", Ok(two.envelope_for(&vendor_box_public_key())));
        let (app, _audit) = app(&authority);

        let response = app.oneshot(as_agent(REDIRECT_URI, "proxy-secret")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Please pick a site to log into.");
        assert_eq!(body["sites"][0]["loginUrl"], one.login_url());
        assert_eq!(body["sites"][1]["loginUrl"], two.login_url());
    }

    #[tokio::test]
    async fn test_webhook_round_trip() {
        let authority = ScriptedAuthority::new();
        authority.respond(SITES_ENDPOINT, Ok(json!({ "LIC-1": ["S9"] })));
        let (app, _audit) = app(&authority);

        let body = r#"{"customer":{"email":"pat@example.com"}}"#;
        let signature = hmac_sha1_base64(WEBHOOK_SECRET.as_bytes(), body.as_bytes()).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/helpscout")
                    .header(WEBHOOK_SIGNATURE_HEADER, signature)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "items": [{
                "licenseKey": "LIC-1",
                "status": "active",
                "url": "https://vendor.example/trustedlogin/S9"
            }]})
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/helpscout")
                    .header(WEBHOOK_SIGNATURE_HEADER, "AAAA")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_published_keys_match_vendor_keys() {
        let (app, _audit) = app(&ScriptedAuthority::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/trustedlogin/v1/public_key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            json_body(response).await["publicKey"],
            vendor_box_public_key().to_hex()
        );
    }
}
