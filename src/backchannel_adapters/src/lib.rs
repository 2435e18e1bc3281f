pub mod config;
pub mod handlers;
pub mod persistence;
pub mod registry;
pub mod token;

pub use config::{BackChannelSettings, SettingsError};
pub use handlers::handle_backchannel_logout;
pub use persistence::{
    dashmap_jti_store::DashMapJtiStore, hashmap_session_registry::HashMapSessionRegistry,
    postgres_session_registry::PostgresSessionRegistry, redis_jti_store::RedisJtiStore,
    redis_session_registry::RedisSessionRegistry,
};
pub use registry::in_memory_client_registry::InMemoryClientRegistry;
pub use token::{
    jwks_key_provider::JwksKeyProvider,
    jwt_logout_token_decoder::JwtLogoutTokenDecoder,
    key_provider::{CompositeKeyProvider, KeyFamily, KeyProvider, StaticKeyProvider, VerificationKey},
};
