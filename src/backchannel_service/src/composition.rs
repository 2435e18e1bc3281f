use std::sync::Arc;

use backchannel_adapters::{
    BackChannelSettings, CompositeKeyProvider, DashMapJtiStore, HashMapSessionRegistry,
    InMemoryClientRegistry, JwksKeyProvider, JwtLogoutTokenDecoder, KeyProvider,
    PostgresSessionRegistry, RedisJtiStore, RedisSessionRegistry, StaticKeyProvider,
    VerificationKey,
    config::{ClientSettings, JwksSettings, ReplayDetection, SessionStoreKind},
};
use backchannel_application::{
    BackChannelLogoutUseCase, LogoutTokenAuthenticator, SessionInvalidationHandler,
};
use backchannel_core::SessionRegistry;
use redis::aio::MultiplexedConnection;
use secrecy::ExposeSecret;

use crate::{
    ServiceSetupError,
    helpers::{configure_postgresql, configure_redis},
};

/// The assembled logout pipeline and the registry it invalidates sessions in.
pub struct LogoutComponents {
    pub use_case: Arc<BackChannelLogoutUseCase>,
    /// Login flows register their sessions here.
    pub sessions: Arc<dyn SessionRegistry>,
}

/// Build the logout pipeline from settings, connecting to any stores they select.
#[tracing::instrument(name = "Building back-channel logout components", skip_all)]
pub async fn build_components(
    settings: &BackChannelSettings,
) -> Result<LogoutComponents, ServiceSetupError> {
    let mut redis = None;

    let sessions: Arc<dyn SessionRegistry> = match settings.session_store {
        SessionStoreKind::Memory => Arc::new(HashMapSessionRegistry::new()),
        SessionStoreKind::Redis => Arc::new(RedisSessionRegistry::new(
            redis_connection(settings, &mut redis).await?,
        )),
        SessionStoreKind::Postgres => {
            let postgres = settings
                .postgres
                .as_ref()
                .ok_or(ServiceSetupError::MissingSection("postgres"))?;
            Arc::new(PostgresSessionRegistry::new(
                configure_postgresql(postgres).await?,
            ))
        }
    };

    let decoder = JwtLogoutTokenDecoder::new(key_provider(&settings.clients, &settings.jwks)?);
    let clients = InMemoryClientRegistry::from_settings(&settings.clients)?;

    let mut authenticator = LogoutTokenAuthenticator::new(decoder, clients)
        .with_clock_skew(settings.validation.clock_skew());
    match settings.validation.replay_detection {
        ReplayDetection::None => {}
        ReplayDetection::Memory => {
            authenticator = authenticator.with_replay_detection(Arc::new(DashMapJtiStore::new()));
        }
        ReplayDetection::Redis => {
            let conn = redis_connection(settings, &mut redis).await?;
            authenticator = authenticator.with_replay_detection(Arc::new(RedisJtiStore::new(conn)));
        }
    }

    tracing::info!(
        clients = settings.clients.len(),
        session_store = ?settings.session_store,
        replay_detection = ?settings.validation.replay_detection,
        "Back-channel logout configured"
    );

    let use_case = BackChannelLogoutUseCase::new(
        Arc::new(authenticator),
        SessionInvalidationHandler::new(Arc::clone(&sessions)),
    );

    Ok(LogoutComponents {
        use_case: Arc::new(use_case),
        sessions,
    })
}

/// Verification keys for every configured client.
pub fn key_provider(
    clients: &[ClientSettings],
    jwks: &JwksSettings,
) -> Result<Arc<dyn KeyProvider>, ServiceSetupError> {
    let mut static_keys = StaticKeyProvider::new();
    let mut jwks_keys = JwksKeyProvider::new(jwks.timeout(), jwks.cache_ttl())?;

    for client in clients {
        if let Some(secret) = &client.hmac_secret {
            static_keys.add_key(
                &client.issuer,
                VerificationKey::hmac(secret.expose_secret().as_bytes()),
            );
        }
        if let Some(pem) = &client.rsa_public_key_pem {
            let key = VerificationKey::rsa_pem(pem.as_bytes()).map_err(|source| {
                ServiceSetupError::VerificationKey {
                    registration_id: client.registration_id.clone(),
                    source,
                }
            })?;
            static_keys.add_key(&client.issuer, key);
        }
        if let Some(jwks_uri) = &client.jwks_uri {
            jwks_keys = jwks_keys.with_issuer(&client.issuer, jwks_uri);
        }
    }

    let mut keys = CompositeKeyProvider::new();
    if !static_keys.is_empty() {
        keys = keys.with_provider(Arc::new(static_keys));
    }
    if !jwks_keys.is_empty() {
        keys = keys.with_provider(Arc::new(jwks_keys));
    }

    Ok(Arc::new(keys))
}

/// One Redis connection, opened on first use and shared by both stores.
async fn redis_connection(
    settings: &BackChannelSettings,
    cached: &mut Option<MultiplexedConnection>,
) -> Result<MultiplexedConnection, ServiceSetupError> {
    if let Some(conn) = cached {
        return Ok(conn.clone());
    }

    let redis = settings
        .redis
        .as_ref()
        .ok_or(ServiceSetupError::MissingSection("redis"))?;
    let conn = configure_redis(redis).await?;
    *cached = Some(conn.clone());

    Ok(conn)
}
