use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

use crate::helpers::{
    JWKS_CLIENT_ID, JWKS_ISSUER, JWKS_SECRET, JWKS_SECRET_B64, TestApp, logout_claims, sign,
};

fn jwks_claims() -> serde_json::Value {
    let mut claims = logout_claims();
    claims["iss"] = JWKS_ISSUER.into();
    claims["aud"] = JWKS_CLIENT_ID.into();
    claims
}

#[tokio::test]
async fn keys_are_fetched_once_and_cached() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{ "kty": "oct", "kid": "k1", "alg": "HS256", "k": JWKS_SECRET_B64 }]
        })))
        .expect(1)
        .mount(&app.jwks_server)
        .await;
    app.register_session(JWKS_CLIENT_ID, JWKS_ISSUER, "s1", "alice", Some("abc"))
        .await;

    let first = app
        .post_logout_token(&sign(&jwks_claims(), JWKS_SECRET, Some("k1")))
        .await;
    let second = app
        .post_logout_token(&sign(&jwks_claims(), JWKS_SECRET, Some("k1")))
        .await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
    assert!(!app.has_session("s1").await);
}

#[tokio::test]
async fn unreachable_key_source_is_a_server_error() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.jwks_server)
        .await;
    app.register_session(JWKS_CLIENT_ID, JWKS_ISSUER, "s1", "alice", Some("abc"))
        .await;

    let response = app
        .post_logout_token(&sign(&jwks_claims(), JWKS_SECRET, Some("k1")))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.json::<serde_json::Value>().await.unwrap(),
        json!({ "error": "Internal server error" })
    );
    assert!(app.has_session("s1").await);
}
