//! Back-channel logout as an axum middleware filter.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{Method, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::Response,
};
use backchannel_adapters::{config::constants::DEFAULT_LOGOUT_PATH, handle_backchannel_logout};
use backchannel_application::BackChannelLogoutUseCase;
use backchannel_core::{LogoutResponseHelpers, OAuth2Error, is_form_urlencoded};

use crate::adapters::{AxumLogoutRequest, DEFAULT_BODY_LIMIT, response_builder};

/// Shared state of the logout filter and route.
#[derive(Clone)]
pub struct BackChannelLogoutState {
    use_case: Arc<BackChannelLogoutUseCase>,
    logout_path: Arc<str>,
    body_limit: usize,
}

impl BackChannelLogoutState {
    pub fn new(use_case: Arc<BackChannelLogoutUseCase>) -> Self {
        Self {
            use_case,
            logout_path: Arc::from(DEFAULT_LOGOUT_PATH),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_logout_path(mut self, logout_path: impl Into<String>) -> Self {
        self.logout_path = Arc::from(logout_path.into());
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn use_case(&self) -> &BackChannelLogoutUseCase {
        &self.use_case
    }

    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}

/// Intercept `POST <logout_path>` requests carrying a logout token.
///
/// Other requests, and logout-path requests without a token, continue down the
/// stack with their body intact. Only form-encoded bodies are buffered.
#[tracing::instrument(
    name = "Back-channel logout filter",
    skip_all,
    fields(method = %request.method(), path = %request.uri().path())
)]
pub async fn backchannel_logout_filter(
    State(state): State<BackChannelLogoutState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST || request.uri().path() != state.logout_path() {
        return next.run(request).await;
    }

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if !is_form_urlencoded(content_type) {
        return next.run(request).await;
    }

    let request = match AxumLogoutRequest::buffer(request, state.body_limit()).await {
        Ok(request) => request,
        Err(reason) => return response_builder().bad_request_error(&OAuth2Error::from(reason)),
    };

    match handle_backchannel_logout(state.use_case(), &request, response_builder()).await {
        Ok(Some(response)) => response,
        Ok(None) => next.run(request.into_request()).await,
        Err(e) => {
            tracing::error!(error = %e, "Back-channel logout failed");
            response_builder().internal_error()
        }
    }
}

/// Install the logout filter on `router`.
///
/// The filter only sees requests that reach the router's routes or fallback,
/// so call this after they are added.
pub fn with_backchannel_logout<S>(router: Router<S>, state: BackChannelLogoutState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        state,
        backchannel_logout_filter,
    ))
}
