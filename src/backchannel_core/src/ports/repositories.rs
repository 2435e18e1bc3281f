use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    client_registration::ClientRegistration,
    session::{SessionCriteria, SessionRecord},
};

// SessionRegistry port trait and errors
#[derive(Debug, Error)]
pub enum SessionRegistryError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt session record: {0}")]
    CorruptRecord(String),
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for SessionRegistryError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Unavailable(_), Self::Unavailable(_))
                | (Self::CorruptRecord(_), Self::CorruptRecord(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// The local session store, as seen by back-channel logout.
///
/// `destroy` must be idempotent: destroying a session that no longer exists
/// succeeds. Implementations provide their own per-session atomicity.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Record a session at OIDC login time so it can be correlated later.
    async fn register(&self, record: SessionRecord) -> Result<(), SessionRegistryError>;

    /// Sessions matching the criteria. An empty result is not an error.
    async fn find(
        &self,
        criteria: &SessionCriteria,
    ) -> Result<Vec<SessionRecord>, SessionRegistryError>;

    async fn destroy(&self, record: &SessionRecord) -> Result<(), SessionRegistryError>;
}

// ClientRegistrationRepository port trait and errors
#[derive(Debug, Error)]
pub enum ClientRegistryError {
    #[error("Duplicate issuer {0}")]
    DuplicateIssuer(String),
    #[error("Client registry unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup of identity-provider registrations.
#[async_trait]
pub trait ClientRegistrationRepository: Send + Sync {
    async fn find_by_issuer(
        &self,
        issuer: &str,
    ) -> Result<Option<ClientRegistration>, ClientRegistryError>;
}

// JtiStore port trait and errors
#[derive(Debug, Error)]
pub enum JtiStoreError {
    #[error("Replay store unavailable: {0}")]
    Unavailable(String),
}

/// Replay detection for logout tokens.
#[async_trait]
pub trait JtiStore: Send + Sync {
    /// Atomically remember `(issuer, jti)` until `expires_at`.
    ///
    /// Returns `true` on first sight and `false` if the pair was already recorded
    /// and has not yet expired.
    async fn record_if_absent(
        &self,
        issuer: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, JtiStoreError>;

    /// Drop a recorded `(issuer, jti)` pair so the token can be accepted again.
    async fn forget(&self, issuer: &str, jti: &str) -> Result<(), JtiStoreError>;
}
