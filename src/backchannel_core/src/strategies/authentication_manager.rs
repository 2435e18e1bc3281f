use async_trait::async_trait;

use crate::domain::{
    error::BackChannelLogoutError, logout_authentication::LogoutAuthentication,
    logout_token::LogoutTokenRequest,
};

/// Turns a raw logout token into a trusted [`LogoutAuthentication`].
///
/// Implementations must be safe to call concurrently for independent tokens.
/// Errors distinguish token defects (`InvalidRequest`, `InvalidToken`) from
/// collaborator outages (`Service`).
#[async_trait]
pub trait LogoutAuthenticationManager: Send + Sync + 'static {
    async fn authenticate(
        &self,
        request: LogoutTokenRequest,
    ) -> Result<LogoutAuthentication, BackChannelLogoutError>;

    /// Undo what [`authenticate`](Self::authenticate) recorded about a token
    /// whose logout could not be carried out, so the issuer's retry is accepted.
    async fn abandon(&self, _authentication: &LogoutAuthentication) {}
}
