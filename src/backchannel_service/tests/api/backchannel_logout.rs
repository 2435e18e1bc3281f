use backchannel_core::{BACKCHANNEL_LOGOUT_TOKEN_URI, BACKCHANNEL_VALIDATION_URI};

use crate::helpers::{CLIENT_ID, HMAC_SECRET, ISSUER, TestApp, error_body, logout_claims, sign};

#[tokio::test]
async fn logout_by_sid_destroys_only_that_session() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;
    app.register_session(CLIENT_ID, ISSUER, "s2", "alice", Some("def"))
        .await;

    let response = app
        .post_logout_token(&sign(&logout_claims(), HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    assert_eq!(response.text().await.unwrap(), "");
    assert!(!app.has_session("s1").await);
    assert!(app.has_session("s2").await);
}

#[tokio::test]
async fn logout_by_subject_destroys_every_session_of_the_user() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;
    app.register_session(CLIENT_ID, ISSUER, "s2", "alice", None)
        .await;
    app.register_session(CLIENT_ID, ISSUER, "s3", "bob", None)
        .await;

    let mut claims = logout_claims();
    claims.as_object_mut().unwrap().remove("sid");
    claims["sub"] = "alice".into();

    let response = app
        .post_logout_token(&sign(&claims, HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(!app.has_session("s1").await);
    assert!(!app.has_session("s2").await);
    assert!(app.has_session("s3").await);
}

#[tokio::test]
async fn logout_without_matching_sessions_still_succeeds() {
    let app = TestApp::new().await;

    let response = app
        .post_logout_token(&sign(&logout_claims(), HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn duplicate_logout_token_is_an_invalid_request() {
    let app = TestApp::new().await;
    let token = sign(&logout_claims(), HMAC_SECRET, None);

    let response = app
        .post_logout(
            "application/x-www-form-urlencoded",
            format!("logout_token={token}&logout_token={token}"),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body = error_body(response).await;
    assert_eq!(body["error_code"], "invalid_request");
    assert_eq!(
        body["error_description"],
        "The logout_token parameter was supplied more than once"
    );
    assert_eq!(body["error_uri"], BACKCHANNEL_VALIDATION_URI);
}

#[tokio::test]
async fn missing_logout_token_is_an_invalid_request() {
    let app = TestApp::new().await;

    let response = app
        .post_logout("application/x-www-form-urlencoded", "state=abc".to_string())
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body = error_body(response).await;
    assert_eq!(body["error_code"], "invalid_request");
    assert_eq!(
        body["error_description"],
        "The logout_token parameter is missing"
    );
}

#[tokio::test]
async fn json_body_is_not_read_as_a_form() {
    let app = TestApp::new().await;
    let token = sign(&logout_claims(), HMAC_SECRET, None);

    let response = app
        .post_logout(
            "application/json",
            format!(r#"{{"logout_token":"{token}"}}"#),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_body(response).await["error_code"], "invalid_request");
}

#[tokio::test]
async fn token_with_nonce_is_an_invalid_token() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;

    let mut claims = logout_claims();
    claims["nonce"] = "n-0S6_WzA2Mj".into();

    let response = app
        .post_logout_token(&sign(&claims, HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body = error_body(response).await;
    assert_eq!(body["error_code"], "invalid_token");
    assert_eq!(
        body["error_description"],
        "The logout token must not contain a nonce claim"
    );
    assert_eq!(body["error_uri"], BACKCHANNEL_LOGOUT_TOKEN_URI);
    assert!(app.has_session("s1").await);
}

#[tokio::test]
async fn forged_signature_is_an_invalid_token() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;

    let response = app
        .post_logout_token(&sign(&logout_claims(), b"forged", None))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body = error_body(response).await;
    assert_eq!(body["error_code"], "invalid_token");
    assert_eq!(
        body["error_description"],
        "The logout token signature is invalid"
    );
    assert!(app.has_session("s1").await);
}

#[tokio::test]
async fn token_for_another_client_is_an_invalid_token() {
    let app = TestApp::new().await;

    let mut claims = logout_claims();
    claims["aud"] = serde_json::json!(["someone-else"]);

    let response = app
        .post_logout_token(&sign(&claims, HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        error_body(response).await["error_description"],
        "The logout token audience does not include this client"
    );
}

#[tokio::test]
async fn expired_token_is_an_invalid_token() {
    let app = TestApp::new().await;

    let mut claims = logout_claims();
    let now = chrono::Utc::now().timestamp();
    claims["iat"] = (now - 3_600).into();
    claims["exp"] = (now - 1_800).into();

    let response = app
        .post_logout_token(&sign(&claims, HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        error_body(response).await["error_description"],
        "The logout token has expired"
    );
}

#[tokio::test]
async fn replayed_token_is_an_invalid_token() {
    let app = TestApp::new().await;
    let token = sign(&logout_claims(), HMAC_SECRET, None);

    let first = app.post_logout_token(&token).await;
    let second = app.post_logout_token(&token).await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 400);
    assert_eq!(
        error_body(second).await["error_description"],
        "The logout token has already been received"
    );
}

#[tokio::test]
async fn token_can_be_retried_after_a_session_store_outage() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;
    app.fail_session_lookups(1);
    let token = sign(&logout_claims(), HMAC_SECRET, None);

    let first = app.post_logout_token(&token).await;
    assert_eq!(first.status().as_u16(), 500);
    assert!(app.has_session("s1").await);

    let retry = app.post_logout_token(&token).await;
    assert_eq!(retry.status().as_u16(), 200);
    assert!(!app.has_session("s1").await);

    let replay = app.post_logout_token(&token).await;
    assert_eq!(replay.status().as_u16(), 400);
}

#[tokio::test]
async fn failed_destroy_does_not_fail_the_logout() {
    let app = TestApp::new().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;
    app.register_session(CLIENT_ID, ISSUER, "s2", "alice", Some("abc"))
        .await;
    app.make_session_stubborn("s2").await;

    let response = app
        .post_logout_token(&sign(&logout_claims(), HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "");
    assert!(!app.has_session("s1").await);
    assert!(app.has_session("s2").await);
}
