use async_trait::async_trait;
use thiserror::Error;

use crate::domain::logout_token::LogoutTokenClaims;

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Unsupported signing algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("No verification keys for issuer {0}")]
    UnknownIssuer(String),
    #[error("Key source unavailable: {0}")]
    KeySourceUnavailable(String),
}

impl TokenDecodeError {
    /// Whether the failure lies with infrastructure rather than the token.
    pub fn is_service_error(&self) -> bool {
        matches!(self, TokenDecodeError::KeySourceUnavailable(_))
    }
}

/// Decodes a compact-serialized logout token and verifies its signature.
///
/// Claim semantics (issuer, audience, timestamps, events) are NOT checked here;
/// that is the authenticator's job.
#[async_trait]
pub trait LogoutTokenDecoder: Send + Sync {
    async fn decode(&self, token: &str) -> Result<LogoutTokenClaims, TokenDecodeError>;
}
