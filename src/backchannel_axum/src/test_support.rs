use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::Method,
    response::Response,
};
use backchannel_application::BackChannelLogoutUseCase;
use backchannel_core::{
    BackChannelLogoutError, ClientRegistration, InvalidTokenReason, InvalidationReport,
    LogoutAuthentication, LogoutAuthenticationManager, LogoutHandler, LogoutIdentifier,
    LogoutTokenRequest, ServiceError, SessionId,
};
use secrecy::ExposeSecret;

/// Accepts "good", rejects "bad", fails on anything else.
struct MockAuthenticationManager;

#[async_trait]
impl LogoutAuthenticationManager for MockAuthenticationManager {
    async fn authenticate(
        &self,
        request: LogoutTokenRequest,
    ) -> Result<LogoutAuthentication, BackChannelLogoutError> {
        match request.token().expose_secret().as_str() {
            "good" => Ok(LogoutAuthentication::new(
                LogoutIdentifier::Session("abc".to_string()),
                ClientRegistration::new("rp1", "rp1", "https://idp.example"),
                "t1",
            )),
            "bad" => Err(InvalidTokenReason::InvalidSignature.into()),
            _ => Err(ServiceError::new("key fetch failed", "timeout").into()),
        }
    }
}

struct OneSessionHandler;

#[async_trait]
impl LogoutHandler for OneSessionHandler {
    async fn logout(
        &self,
        _authentication: &LogoutAuthentication,
    ) -> Result<InvalidationReport, ServiceError> {
        let mut report = InvalidationReport::new();
        report.record_invalidated(SessionId::new("s1"));
        Ok(report)
    }
}

pub fn use_case() -> BackChannelLogoutUseCase {
    BackChannelLogoutUseCase::new(Arc::new(MockAuthenticationManager), OneSessionHandler)
}

pub fn form_post(path: &str, body: impl Into<String>) -> Request {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.into()))
        .unwrap()
}

pub async fn read_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
