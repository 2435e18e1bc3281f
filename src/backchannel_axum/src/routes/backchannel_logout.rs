//! Axum-specific back-channel logout route.

use axum::{
    extract::{Request, State},
    response::Response,
};
use backchannel_adapters::handle_backchannel_logout;
use backchannel_core::{InvalidRequestReason, LogoutResponseHelpers, OAuth2Error};

use crate::{
    adapters::{AxumLogoutRequest, response_builder},
    middleware::BackChannelLogoutState,
};

/// Back-channel logout endpoint mounted as a plain route.
///
/// Nothing sits behind this route, so a request without a logout token is
/// answered with 400 `invalid_request`.
#[tracing::instrument(name = "Back-channel logout", skip_all)]
pub async fn backchannel_logout(
    State(state): State<BackChannelLogoutState>,
    request: Request,
) -> Response {
    let request = match AxumLogoutRequest::buffer(request, state.body_limit()).await {
        Ok(request) => request,
        Err(reason) => return response_builder().bad_request_error(&OAuth2Error::from(reason)),
    };

    match handle_backchannel_logout(state.use_case(), &request, response_builder()).await {
        Ok(Some(response)) => response,
        Ok(None) => response_builder()
            .bad_request_error(&OAuth2Error::from(InvalidRequestReason::MissingLogoutToken)),
        Err(e) => {
            tracing::error!(error = %e, "Back-channel logout failed");
            response_builder().internal_error()
        }
    }
}
