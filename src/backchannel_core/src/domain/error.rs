//! Error taxonomy for back-channel logout processing.
//!
//! Failures fall into three buckets:
//!
//! - `InvalidRequest`: the logout request itself is malformed (duplicate or empty
//!   `logout_token` parameter).
//! - `InvalidToken`: the logout token failed a semantic or cryptographic check.
//! - `Service`: a collaborator failed for reasons the caller did not cause.
//!
//! Only the first two are ever rendered to the identity provider, and only
//! through the fixed descriptions below.

use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;

/// Where a relying party documents how logout tokens are validated.
pub const BACKCHANNEL_VALIDATION_URI: &str =
    "https://openid.net/specs/openid-connect-backchannel-1_0.html#Validation";

/// The section describing which claims a logout token must and must not carry.
pub const BACKCHANNEL_LOGOUT_TOKEN_URI: &str =
    "https://openid.net/specs/openid-connect-backchannel-1_0.html#LogoutToken";

/// OAuth 2.0 error codes emitted by the logout endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    InvalidToken,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidToken => "invalid_token",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidRequestReason {
    #[error("The logout_token parameter was supplied more than once")]
    DuplicateLogoutToken,
    #[error("The logout_token parameter is empty")]
    EmptyLogoutToken,
    #[error("The logout_token parameter is missing")]
    MissingLogoutToken,
    #[error("The request body could not be read")]
    UnreadableBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTokenReason {
    #[error("The logout token could not be decoded")]
    Malformed,
    #[error("The logout token signature is invalid")]
    InvalidSignature,
    #[error("The logout token issuer is not a registered identity provider")]
    UnknownIssuer,
    #[error("The logout token audience does not include this client")]
    AudienceMismatch,
    #[error("The logout token is missing the iat claim")]
    MissingIssuedAt,
    #[error("The logout token was issued in the future")]
    IssuedInFuture,
    #[error("The logout token is missing the exp claim")]
    MissingExpiry,
    #[error("The logout token has expired")]
    Expired,
    #[error("The logout token is missing the jti claim")]
    MissingJti,
    #[error("The logout token events claim does not contain a back-channel logout event")]
    MissingLogoutEvent,
    #[error("The logout token must not contain a nonce claim")]
    NonceForbidden,
    #[error("The logout token must contain a sub claim, a sid claim, or both")]
    MissingSubjectAndSession,
    #[error("The logout token has already been received")]
    Replayed,
}

impl InvalidTokenReason {
    /// A more specific reference than the generic validation section, when one exists.
    pub fn uri(&self) -> Option<&'static str> {
        match self {
            InvalidTokenReason::MissingLogoutEvent
            | InvalidTokenReason::NonceForbidden
            | InvalidTokenReason::MissingSubjectAndSession => Some(BACKCHANNEL_LOGOUT_TOKEN_URI),
            _ => None,
        }
    }
}

/// A collaborator failure that is not attributable to the caller.
///
/// The context is a short, fixed phrase for operators. The source carries the
/// collaborator's own error and is only ever logged.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct ServiceError {
    context: &'static str,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl ServiceError {
    pub fn new(
        context: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            context,
            source: source.into(),
        }
    }

    pub fn context(&self) -> &'static str {
        self.context
    }
}

#[derive(Debug, Error)]
pub enum BackChannelLogoutError {
    #[error("Invalid request: {0}")]
    InvalidRequest(InvalidRequestReason),
    #[error("Invalid token: {0}")]
    InvalidToken(InvalidTokenReason),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl BackChannelLogoutError {
    pub fn is_service_error(&self) -> bool {
        matches!(self, BackChannelLogoutError::Service(_))
    }

    /// The wire representation of a client-caused failure.
    ///
    /// Returns `None` for service errors, which must never be disguised as a
    /// protocol violation.
    pub fn oauth2_error(&self) -> Option<OAuth2Error> {
        match self {
            BackChannelLogoutError::InvalidRequest(reason) => Some((*reason).into()),
            BackChannelLogoutError::InvalidToken(reason) => Some((*reason).into()),
            BackChannelLogoutError::Service(_) => None,
        }
    }

    /// Split into the wire error for the caller, or the service failure to propagate.
    pub fn into_protocol_error(self) -> Result<OAuth2Error, ServiceError> {
        match self {
            BackChannelLogoutError::InvalidRequest(reason) => Ok(reason.into()),
            BackChannelLogoutError::InvalidToken(reason) => Ok(reason.into()),
            BackChannelLogoutError::Service(e) => Err(e),
        }
    }
}

impl From<InvalidRequestReason> for OAuth2Error {
    fn from(reason: InvalidRequestReason) -> Self {
        OAuth2Error::new(ErrorCode::InvalidRequest, reason.to_string(), None)
    }
}

impl From<InvalidTokenReason> for OAuth2Error {
    fn from(reason: InvalidTokenReason) -> Self {
        OAuth2Error::new(ErrorCode::InvalidToken, reason.to_string(), reason.uri())
    }
}

impl From<InvalidRequestReason> for BackChannelLogoutError {
    fn from(reason: InvalidRequestReason) -> Self {
        BackChannelLogoutError::InvalidRequest(reason)
    }
}

impl From<InvalidTokenReason> for BackChannelLogoutError {
    fn from(reason: InvalidTokenReason) -> Self {
        BackChannelLogoutError::InvalidToken(reason)
    }
}

/// The JSON error body returned with a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuth2Error {
    error_code: String,
    error_description: String,
    error_uri: String,
}

impl OAuth2Error {
    pub fn new(code: ErrorCode, description: impl Into<String>, uri: Option<&str>) -> Self {
        Self {
            error_code: code.as_str().to_owned(),
            error_description: description.into(),
            error_uri: uri.unwrap_or(BACKCHANNEL_VALIDATION_URI).to_owned(),
        }
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn description(&self) -> &str {
        &self.error_description
    }

    pub fn uri(&self) -> &str {
        &self.error_uri
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error_code": self.error_code,
            "error_description": self.error_description,
            "error_uri": self.error_uri,
        })
    }
}
