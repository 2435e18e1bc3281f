use std::{collections::HashSet, time::Duration};

use backchannel_application::DEFAULT_CLOCK_SKEW_SECONDS;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use secrecy::Secret;
use serde::Deserialize;

use super::constants::{self, env};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Settings for the back-channel logout service.
///
/// Layered from `config/base.json`, then `config/{APP_ENVIRONMENT}.json`, then
/// `BACKCHANNEL__*` environment variables.
#[derive(Debug, Deserialize)]
pub struct BackChannelSettings {
    pub application: ApplicationSettings,
    pub validation: ValidationSettings,
    #[serde(default)]
    pub jwks: JwksSettings,
    #[serde(default)]
    pub redis: Option<RedisSettings>,
    #[serde(default)]
    pub postgres: Option<PostgresSettings>,
    #[serde(default)]
    pub session_store: SessionStoreKind,
    #[serde(default)]
    pub clients: Vec<ClientSettings>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidationSettings {
    #[serde(default = "default_clock_skew_seconds")]
    pub clock_skew_seconds: i64,
    pub replay_detection: ReplayDetection,
}

impl ValidationSettings {
    pub fn clock_skew(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.clock_skew_seconds)
    }
}

/// Where seen `(iss, jti)` pairs are remembered, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayDetection {
    None,
    Memory,
    Redis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    #[default]
    Memory,
    Redis,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct JwksSettings {
    pub cache_ttl_seconds: u64,
    pub timeout_millis: u64,
}

impl JwksSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl Default for JwksSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: constants::jwks::CACHE_TTL.as_secs(),
            timeout_millis: constants::jwks::TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

/// One identity provider this relying party is registered with.
///
/// At least one of `jwks_uri`, `hmac_secret` or `rsa_public_key_pem` must be set.
#[derive(Debug, Deserialize)]
pub struct ClientSettings {
    pub registration_id: String,
    pub client_id: String,
    pub issuer: String,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub hmac_secret: Option<Secret<String>>,
    #[serde(default)]
    pub rsa_public_key_pem: Option<String>,
}

impl ClientSettings {
    fn has_key_source(&self) -> bool {
        self.jwks_uri.is_some() || self.hmac_secret.is_some() || self.rsa_public_key_pem.is_some()
    }
}

fn default_address() -> String {
    constants::prod::APP_ADDRESS.to_owned()
}

fn default_logout_path() -> String {
    constants::DEFAULT_LOGOUT_PATH.to_owned()
}

fn default_clock_skew_seconds() -> i64 {
    DEFAULT_CLOCK_SKEW_SECONDS
}

impl BackChannelSettings {
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let config_dir = std::env::var(env::CONFIG_DIR_ENV_VAR)
            .unwrap_or_else(|_| constants::DEFAULT_CONFIG_DIR.to_owned());
        let environment = std::env::var(env::APP_ENVIRONMENT_ENV_VAR)
            .unwrap_or_else(|_| constants::DEFAULT_ENVIRONMENT.to_owned());

        let builder = Config::builder()
            .add_source(File::new(&format!("{config_dir}/base"), FileFormat::Json).required(false))
            .add_source(
                File::new(&format!("{config_dir}/{environment}"), FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(env::SETTINGS_ENV_PREFIX)
                    .prefix_separator(env::SETTINGS_ENV_SEPARATOR)
                    .separator(env::SETTINGS_ENV_SEPARATOR)
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Self::from_builder(Config::builder().add_source(File::from_str(json, FileFormat::Json)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !self.application.logout_path.starts_with('/') {
            return Err(SettingsError::Invalid(format!(
                "logout_path must start with '/': {}",
                self.application.logout_path
            )));
        }

        if self.validation.clock_skew_seconds < 0 {
            return Err(SettingsError::Invalid(
                "clock_skew_seconds must not be negative".to_owned(),
            ));
        }

        let mut registration_ids = HashSet::new();
        let mut issuers = HashSet::new();
        for client in &self.clients {
            if !registration_ids.insert(client.registration_id.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "duplicate registration_id {}",
                    client.registration_id
                )));
            }
            if !issuers.insert(client.issuer.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "duplicate issuer {}",
                    client.issuer
                )));
            }
            if !client.has_key_source() {
                return Err(SettingsError::Invalid(format!(
                    "client {} has no verification key source",
                    client.registration_id
                )));
            }
        }

        let needs_redis = self.session_store == SessionStoreKind::Redis
            || self.validation.replay_detection == ReplayDetection::Redis;
        if needs_redis && self.redis.is_none() {
            return Err(SettingsError::Invalid(
                "a redis section is required by the selected stores".to_owned(),
            ));
        }
        if self.session_store == SessionStoreKind::Postgres && self.postgres.is_none() {
            return Err(SettingsError::Invalid(
                "a postgres section is required by the postgres session store".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const MINIMAL: &str = r#"{
        "application": { "address": "127.0.0.1:0" },
        "validation": { "replay_detection": "memory" }
    }"#;

    #[test]
    fn defaults_are_applied() {
        let settings = BackChannelSettings::from_json(MINIMAL).unwrap();

        assert_eq!(settings.application.logout_path, "/logout/connect/back-channel");
        assert_eq!(settings.validation.clock_skew_seconds, 60);
        assert_eq!(settings.validation.replay_detection, ReplayDetection::Memory);
        assert_eq!(settings.session_store, SessionStoreKind::Memory);
        assert_eq!(settings.jwks.cache_ttl(), Duration::from_secs(300));
        assert!(settings.clients.is_empty());
    }

    #[test]
    fn replay_detection_must_be_chosen() {
        let json = r#"{
            "application": { "address": "127.0.0.1:0" },
            "validation": {}
        }"#;

        assert!(matches!(
            BackChannelSettings::from_json(json),
            Err(SettingsError::Load(_))
        ));
    }

    #[test]
    fn clients_are_parsed() {
        let json = r#"{
            "application": { "address": "0.0.0.0:3000", "logout_path": "/bcl" },
            "validation": { "clock_skew_seconds": 30, "replay_detection": "none" },
            "clients": [
                {
                    "registration_id": "idp",
                    "client_id": "rp1",
                    "issuer": "https://idp.example",
                    "hmac_secret": "s3cr3t"
                },
                {
                    "registration_id": "other",
                    "client_id": "rp1",
                    "issuer": "https://other.example",
                    "jwks_uri": "https://other.example/jwks"
                }
            ]
        }"#;

        let settings = BackChannelSettings::from_json(json).unwrap();

        assert_eq!(settings.application.logout_path, "/bcl");
        assert_eq!(settings.validation.clock_skew(), chrono::Duration::seconds(30));
        assert_eq!(settings.clients.len(), 2);
        assert_eq!(
            settings.clients[0]
                .hmac_secret
                .as_ref()
                .map(|s| s.expose_secret().as_str()),
            Some("s3cr3t")
        );
        assert_eq!(
            settings.clients[1].jwks_uri.as_deref(),
            Some("https://other.example/jwks")
        );
    }

    #[test]
    fn duplicate_issuer_is_rejected() {
        let json = r#"{
            "application": { "address": "127.0.0.1:0" },
            "validation": { "replay_detection": "none" },
            "clients": [
                { "registration_id": "a", "client_id": "rp", "issuer": "https://idp", "hmac_secret": "x" },
                { "registration_id": "b", "client_id": "rp", "issuer": "https://idp", "hmac_secret": "y" }
            ]
        }"#;

        assert!(matches!(
            BackChannelSettings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn client_without_keys_is_rejected() {
        let json = r#"{
            "application": { "address": "127.0.0.1:0" },
            "validation": { "replay_detection": "none" },
            "clients": [ { "registration_id": "a", "client_id": "rp", "issuer": "https://idp" } ]
        }"#;

        assert!(matches!(
            BackChannelSettings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn redis_stores_require_redis_section() {
        let json = r#"{
            "application": { "address": "127.0.0.1:0" },
            "validation": { "replay_detection": "redis" }
        }"#;

        assert!(matches!(
            BackChannelSettings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn postgres_store_requires_postgres_section() {
        let json = r#"{
            "application": { "address": "127.0.0.1:0" },
            "validation": { "replay_detection": "none" },
            "session_store": "postgres"
        }"#;

        assert!(matches!(
            BackChannelSettings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }
}
