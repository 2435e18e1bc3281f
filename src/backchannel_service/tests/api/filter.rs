use crate::helpers::{CLIENT_ID, HMAC_SECRET, ISSUER, TestApp, error_body, logout_claims, sign};

#[tokio::test]
async fn filter_handles_logout_tokens() {
    let app = TestApp::with_downstream().await;
    app.register_session(CLIENT_ID, ISSUER, "s1", "alice", Some("abc"))
        .await;

    let response = app
        .post_logout_token(&sign(&logout_claims(), HMAC_SECRET, None))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "");
    assert!(!app.has_session("s1").await);
}

#[tokio::test]
async fn filter_passes_requests_without_a_token_downstream() {
    let app = TestApp::with_downstream().await;

    let response = app
        .post_logout("application/x-www-form-urlencoded", "state=abc".to_string())
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "downstream: state=abc");
}

#[tokio::test]
async fn filter_rejects_invalid_tokens() {
    let app = TestApp::with_downstream().await;

    let response = app.post_logout_token("not-a-jwt").await;

    assert_eq!(response.status().as_u16(), 400);
    let body = error_body(response).await;
    assert_eq!(body["error_code"], "invalid_token");
    assert_eq!(
        body["error_description"],
        "The logout token could not be decoded"
    );
}

#[tokio::test]
async fn filter_passes_large_non_form_bodies_downstream() {
    let app = TestApp::with_downstream().await;
    let body = format!(r#"{{"payload":"{}"}}"#, "x".repeat(100 * 1024));

    let response = app.post_logout("application/json", body.clone()).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        format!("downstream: {body}")
    );
}
