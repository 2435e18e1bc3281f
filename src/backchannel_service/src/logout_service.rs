use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use backchannel_axum::{BackChannelLogoutState, routes::backchannel_logout};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::telemetry::{make_span_with_request_id, on_request, on_response};

/// Standalone back-channel logout endpoint.
pub struct LogoutService {
    router: Router,
}

impl LogoutService {
    /// Mount the logout route at the state's logout path, next to `/health`.
    pub fn new(state: BackChannelLogoutState) -> Self {
        let logout_path = state.logout_path().to_owned();

        let router = Router::new()
            .route("/health", get(health))
            .route(&logout_path, post(backchannel_logout))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// The service as a router that can be nested into another application.
    pub fn as_nested_router(self) -> Router {
        self.with_trace_layer().router
    }

    /// Run as a standalone server on `listener`.
    pub async fn run_standalone(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let router = self.as_nested_router();

        tracing::info!("Back-channel logout service listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}
