pub mod use_cases;

pub use use_cases::{
    authenticate_logout_token::{DEFAULT_CLOCK_SKEW_SECONDS, LogoutTokenAuthenticator},
    backchannel_logout::{BackChannelLogoutOutcome, BackChannelLogoutUseCase},
    convert_logout_request::{LOGOUT_TOKEN_PARAMETER, LogoutTokenConverter},
    invalidate_sessions::SessionInvalidationHandler,
    resolve_sessions::{SessionCorrelationResolver, SessionMatches},
};
