pub mod authenticate_logout_token;
pub mod backchannel_logout;
pub mod convert_logout_request;
pub mod invalidate_sessions;
pub mod resolve_sessions;
