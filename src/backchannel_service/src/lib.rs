mod composition;
mod error;
mod helpers;
mod logout_service;
mod telemetry;

pub use composition::{LogoutComponents, build_components, key_provider};
pub use error::ServiceSetupError;
pub use helpers::{configure_postgresql, configure_redis, get_postgres_pool, get_redis_client};
pub use logout_service::LogoutService;
pub use telemetry::init_tracing;

// Re-export commonly used types
pub use backchannel_adapters::BackChannelSettings;
pub use backchannel_axum::{BackChannelLogoutState, with_backchannel_logout};
pub use backchannel_core::{SessionId, SessionRecord, SessionRegistry};
