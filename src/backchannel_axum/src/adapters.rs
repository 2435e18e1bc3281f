//! Axum implementations of the back-channel logout HTTP traits.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  backchannel_core::LogoutRequest (trait)       │
//! └────────────────┬───────────────────────────────┘
//!                  │
//!                  ▼
//! ┌────────────────────────────────────────────────┐
//! │  AxumLogoutRequest { parts, body, form }       │
//! │  impl LogoutRequest for AxumLogoutRequest { }  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The body is buffered once so the same request can be handed downstream
//! untouched when it carries no logout token.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, request::Parts},
};
use backchannel_core::{
    InvalidRequestReason, InvalidationReport, LogoutRequest, LogoutResponseBuilder,
};

/// Largest logout request body that will be buffered.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// A buffered axum request.
pub struct AxumLogoutRequest {
    parts: Parts,
    body: Bytes,
    form: Vec<(String, String)>,
}

impl AxumLogoutRequest {
    /// Parse the form body, if the request declares one.
    pub fn from_parts(parts: Parts, body: Bytes) -> Result<Self, InvalidRequestReason> {
        let mut request = Self {
            parts,
            body,
            form: Vec::new(),
        };

        if request.is_form_urlencoded() {
            request.form = serde_urlencoded::from_bytes(&request.body).map_err(|e| {
                tracing::debug!(error = %e, "Unreadable form body");
                InvalidRequestReason::UnreadableBody
            })?;
        }

        Ok(request)
    }

    /// Buffer at most `limit` bytes of the request body.
    pub async fn buffer(request: Request, limit: usize) -> Result<Self, InvalidRequestReason> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, limit).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to buffer logout request body");
            InvalidRequestReason::UnreadableBody
        })?;

        Self::from_parts(parts, body)
    }

    /// Rebuild the original request, body included.
    pub fn into_request(self) -> Request {
        Request::from_parts(self.parts, Body::from(self.body))
    }
}

impl LogoutRequest for AxumLogoutRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn path(&self) -> &str {
        self.parts.uri.path()
    }

    fn form_parameter(&self, name: &str) -> Vec<&str> {
        self.form
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// Builds `Response<Body>` values.
///
/// An attached [`InvalidationReport`] is stored in the response extensions.
pub struct AxumResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
    report: Option<InvalidationReport>,
}

impl AxumResponseBuilder {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
            report: None,
        }
    }
}

impl Default for AxumResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogoutResponseBuilder for AxumResponseBuilder {
    type Response = Response<Body>;

    fn status(mut self, code: u16) -> Self {
        self.status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "Dropping invalid response header"),
        }
        self
    }

    fn json_body(mut self, body: serde_json::Value) -> Self {
        self.headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(body.to_string());
        self
    }

    fn invalidation_report(mut self, report: InvalidationReport) -> Self {
        self.report = Some(report);
        self
    }

    fn build(self) -> Self::Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(report) = self.report {
            response.extensions_mut().insert(report);
        }
        response
    }
}

pub fn response_builder() -> AxumResponseBuilder {
    AxumResponseBuilder::new()
}
