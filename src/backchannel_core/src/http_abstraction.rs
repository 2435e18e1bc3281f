//! HTTP abstraction traits for the back-channel logout pipeline.
//!
//! Web frameworks implement these on newtype wrappers of their own request and
//! response types, so the converter and the endpoint handler stay framework
//! agnostic.
//!
//! ```ignore
//! // In backchannel-axum
//! pub struct AxumLogoutRequest { parts: Parts, form: Vec<(String, String)> }
//!
//! impl LogoutRequest for AxumLogoutRequest {
//!     fn header(&self, name: &str) -> Option<&str> {
//!         self.parts.headers.get(name)?.to_str().ok()
//!     }
//!     // ...
//! }
//! ```

use crate::domain::{error::OAuth2Error, invalidation::InvalidationReport};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An inbound request that may carry a logout token.
pub trait LogoutRequest {
    /// Header lookup, case-insensitive. `None` if absent or not valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    fn method(&self) -> &str;

    fn path(&self) -> &str;

    /// Every value of a form-encoded body parameter, in body order.
    ///
    /// Must be empty when the body is not `application/x-www-form-urlencoded`.
    fn form_parameter(&self, name: &str) -> Vec<&str>;

    fn is_form_urlencoded(&self) -> bool {
        is_form_urlencoded(self.header("content-type"))
    }
}

/// Whether a `Content-Type` value names a form-encoded body, parameters ignored.
pub fn is_form_urlencoded(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}

/// Builder for the responses the endpoint emits.
///
/// ```ignore
/// builder
///     .status(400)
///     .json_body(error.to_json())
///     .build()
/// ```
pub trait LogoutResponseBuilder: Sized {
    type Response;

    fn status(self, code: u16) -> Self;

    fn header(self, name: &str, value: &str) -> Self;

    /// Set a JSON body and the `application/json` content type.
    fn json_body(self, body: serde_json::Value) -> Self;

    /// Attach the per-session outcome of a logout for the embedding application.
    ///
    /// The report never reaches the identity provider. Builders without a side
    /// channel ignore it.
    fn invalidation_report(self, _report: InvalidationReport) -> Self {
        self
    }

    fn build(self) -> Self::Response;
}

/// Common back-channel logout responses, implemented for every builder.
pub trait LogoutResponseHelpers: LogoutResponseBuilder {
    /// 200 with an empty body.
    fn ok_empty(self) -> Self::Response {
        self.status(200).header("cache-control", "no-store").build()
    }

    fn bad_request_error(self, error: &OAuth2Error) -> Self::Response {
        self.status(400)
            .header("cache-control", "no-store")
            .json_body(error.to_json())
            .build()
    }

    /// 500 with a generic body. Collaborator detail is never rendered.
    fn internal_error(self) -> Self::Response {
        self.status(500)
            .json_body(serde_json::json!({ "error": "Internal server error" }))
            .build()
    }
}

impl<T: LogoutResponseBuilder> LogoutResponseHelpers for T {}
