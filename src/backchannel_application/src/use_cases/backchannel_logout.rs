use std::sync::Arc;

use arc_swap::ArcSwap;

use backchannel_core::{
    InvalidationReport, LogoutAuthenticationManager, LogoutHandler, LogoutRequest, OAuth2Error,
    ServiceError,
};

use super::convert_logout_request::LogoutTokenConverter;

/// How a request to the logout endpoint ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackChannelLogoutOutcome {
    /// No logout token was present; the request belongs downstream.
    NotRequested,
    /// The token was accepted and the handler ran.
    LoggedOut(InvalidationReport),
    /// The request or token was rejected. Rendered as 400.
    Rejected(OAuth2Error),
}

/// Back-channel logout use case: convert, authenticate, then log out.
///
/// Service failures are returned as `Err` and must surface as 5xx. Everything
/// the caller did wrong comes back as [`BackChannelLogoutOutcome::Rejected`].
pub struct BackChannelLogoutUseCase {
    converter: LogoutTokenConverter,
    authentication_manager: Arc<dyn LogoutAuthenticationManager>,
    logout_handler: ArcSwap<Box<dyn LogoutHandler>>,
}

impl BackChannelLogoutUseCase {
    pub fn new(
        authentication_manager: Arc<dyn LogoutAuthenticationManager>,
        logout_handler: impl LogoutHandler,
    ) -> Self {
        let logout_handler: Box<dyn LogoutHandler> = Box::new(logout_handler);
        Self {
            converter: LogoutTokenConverter::new(),
            authentication_manager,
            logout_handler: ArcSwap::from_pointee(logout_handler),
        }
    }

    /// Replace the logout handler. Requests already past authentication keep the
    /// handler they loaded.
    pub fn set_logout_handler(&self, logout_handler: impl LogoutHandler) {
        let logout_handler: Box<dyn LogoutHandler> = Box::new(logout_handler);
        self.logout_handler.store(Arc::new(logout_handler));
    }

    #[tracing::instrument(name = "BackChannelLogoutUseCase::execute", skip_all)]
    pub async fn execute<R>(&self, request: &R) -> Result<BackChannelLogoutOutcome, ServiceError>
    where
        R: LogoutRequest + Sync,
    {
        let token = match self.converter.convert(request) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(BackChannelLogoutOutcome::NotRequested),
            Err(e) => {
                tracing::debug!(reason = %e, "Logout request rejected");
                return e.into_protocol_error().map(BackChannelLogoutOutcome::Rejected);
            }
        };

        let authentication = match self.authentication_manager.authenticate(token).await {
            Ok(authentication) => authentication,
            Err(e) => return e.into_protocol_error().map(BackChannelLogoutOutcome::Rejected),
        };

        let logout_handler = self.logout_handler.load_full();
        match logout_handler.logout(&authentication).await {
            Ok(report) => Ok(BackChannelLogoutOutcome::LoggedOut(report)),
            Err(e) => {
                // The issuer will retry a 5xx with the same token
                self.authentication_manager.abandon(&authentication).await;
                Err(e)
            }
        }
    }
}
