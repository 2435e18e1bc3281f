//! Framework-agnostic back-channel logout handler.

use backchannel_application::{BackChannelLogoutOutcome, BackChannelLogoutUseCase};
use backchannel_core::{LogoutRequest, LogoutResponseBuilder, LogoutResponseHelpers, ServiceError};

/// Handle a request to the back-channel logout endpoint.
///
/// Returns `Ok(None)` when the request carries no logout token, leaving the
/// caller to pass it downstream or reject it. Service failures are returned
/// unrendered so the framework layer can log them and answer 500.
///
/// # Example
///
/// ```ignore
/// let builder = response_builder();
/// match handle_backchannel_logout(&use_case, &request, builder).await {
///     Ok(Some(response)) => response,
///     Ok(None) => next.run(request.into_inner()).await,
///     Err(_) => response_builder().internal_error(),
/// }
/// ```
pub async fn handle_backchannel_logout<R, B>(
    use_case: &BackChannelLogoutUseCase,
    request: &R,
    builder: B,
) -> Result<Option<B::Response>, ServiceError>
where
    R: LogoutRequest + Sync,
    B: LogoutResponseBuilder,
{
    let response = match use_case.execute(request).await? {
        BackChannelLogoutOutcome::NotRequested => return Ok(None),
        BackChannelLogoutOutcome::Rejected(error) => builder.bad_request_error(&error),
        BackChannelLogoutOutcome::LoggedOut(report) => {
            builder.invalidation_report(report).ok_empty()
        }
    };

    Ok(Some(response))
}
