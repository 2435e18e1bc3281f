use backchannel_adapters::SettingsError;
use backchannel_core::ClientRegistryError;
use thiserror::Error;

/// Failures while assembling the service from its settings.
#[derive(Debug, Error)]
pub enum ServiceSetupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Invalid client registrations: {0}")]
    ClientRegistry(#[from] ClientRegistryError),
    #[error("Invalid verification key for client {registration_id}: {source}")]
    VerificationKey {
        registration_id: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("Failed to build the JWKS client: {0}")]
    JwksClient(#[from] reqwest::Error),
    #[error("A {0} section is required by the selected stores")]
    MissingSection(&'static str),
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
