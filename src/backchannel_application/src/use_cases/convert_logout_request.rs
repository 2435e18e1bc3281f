use backchannel_core::{
    BackChannelLogoutError, InvalidRequestReason, LogoutRequest, LogoutTokenRequest,
};

pub const LOGOUT_TOKEN_PARAMETER: &str = "logout_token";

/// Extracts the `logout_token` form parameter from an inbound request.
///
/// No validation of the token itself happens here.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogoutTokenConverter;

impl LogoutTokenConverter {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(None)` means the request carries no logout token and belongs to the
    /// downstream pipeline.
    pub fn convert<R: LogoutRequest>(
        &self,
        request: &R,
    ) -> Result<Option<LogoutTokenRequest>, BackChannelLogoutError> {
        if !request.is_form_urlencoded() {
            return Ok(None);
        }

        match request.form_parameter(LOGOUT_TOKEN_PARAMETER).as_slice() {
            [] => Ok(None),
            [token] if token.is_empty() => Err(InvalidRequestReason::EmptyLogoutToken.into()),
            [token] => Ok(Some(LogoutTokenRequest::from(token.to_string()))),
            _ => Err(InvalidRequestReason::DuplicateLogoutToken.into()),
        }
    }
}
