pub mod domain;
pub mod http_abstraction;
pub mod ports;
pub mod strategies;

// Re-export commonly used types for convenience
pub use domain::{
    client_registration::ClientRegistration,
    error::{
        BACKCHANNEL_LOGOUT_TOKEN_URI, BACKCHANNEL_VALIDATION_URI, BackChannelLogoutError,
        ErrorCode, InvalidRequestReason, InvalidTokenReason, OAuth2Error, ServiceError,
    },
    invalidation::{InvalidationOutcome, InvalidationReport, SessionInvalidation},
    logout_authentication::{LogoutAuthentication, LogoutIdentifier},
    logout_token::{BACKCHANNEL_LOGOUT_EVENT, LogoutTokenClaims, LogoutTokenRequest},
    session::{SessionCriteria, SessionId, SessionRecord},
};

pub use ports::{
    repositories::{
        ClientRegistrationRepository, ClientRegistryError, JtiStore, JtiStoreError,
        SessionRegistry, SessionRegistryError,
    },
    services::{LogoutTokenDecoder, TokenDecodeError},
};

pub use strategies::{
    authentication_manager::LogoutAuthenticationManager, logout_handler::LogoutHandler,
};

pub use http_abstraction::{
    LogoutRequest, LogoutResponseBuilder, LogoutResponseHelpers, is_form_urlencoded,
};
