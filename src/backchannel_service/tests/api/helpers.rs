use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Router, routing::post};
use backchannel_adapters::{
    CompositeKeyProvider, DashMapJtiStore, HashMapSessionRegistry, InMemoryClientRegistry,
    JwksKeyProvider, JwtLogoutTokenDecoder, StaticKeyProvider, VerificationKey,
    config::constants::{DEFAULT_LOGOUT_PATH, test},
};
use backchannel_application::{
    BackChannelLogoutUseCase, LogoutTokenAuthenticator, SessionInvalidationHandler,
};
use backchannel_core::{
    BACKCHANNEL_LOGOUT_EVENT, ClientRegistration, SessionCriteria, SessionId, SessionRecord,
    SessionRegistry, SessionRegistryError,
};
use backchannel_service::{BackChannelLogoutState, LogoutService, with_backchannel_logout};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::RwLock};
use wiremock::MockServer;

pub const ISSUER: &str = "https://idp.example";
pub const CLIENT_ID: &str = "rp1";
pub const HMAC_SECRET: &[u8] = b"idp-shared-secret";

pub const JWKS_ISSUER: &str = "https://jwks-idp.example";
pub const JWKS_CLIENT_ID: &str = "rp2";
pub const JWKS_SECRET: &[u8] = b"jwks-shared-secret";
/// `JWKS_SECRET`, base64url-encoded for an `oct` JWK.
pub const JWKS_SECRET_B64: &str = "andrcy1zaGFyZWQtc2VjcmV0";

/// Session store whose lookups and destroys can be made to fail.
#[derive(Clone, Default)]
pub struct FaultySessions {
    inner: HashMapSessionRegistry,
    failing_finds: Arc<AtomicUsize>,
    stubborn: Arc<RwLock<HashSet<String>>>,
}

#[async_trait::async_trait]
impl SessionRegistry for FaultySessions {
    async fn register(&self, record: SessionRecord) -> Result<(), SessionRegistryError> {
        self.inner.register(record).await
    }

    async fn find(
        &self,
        criteria: &SessionCriteria,
    ) -> Result<Vec<SessionRecord>, SessionRegistryError> {
        let should_fail = self
            .failing_finds
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SessionRegistryError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        self.inner.find(criteria).await
    }

    async fn destroy(&self, record: &SessionRecord) -> Result<(), SessionRegistryError> {
        if self.stubborn.read().await.contains(record.session_id().as_str()) {
            return Err(SessionRegistryError::Unavailable("store offline".to_string()));
        }
        self.inner.destroy(record).await
    }
}

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
    pub sessions: FaultySessions,
    pub jwks_server: MockServer,
}

impl TestApp {
    /// The standalone service.
    pub async fn new() -> Self {
        Self::spawn(|state| LogoutService::new(state).as_nested_router()).await
    }

    /// The logout filter in front of a downstream route at the logout path.
    pub async fn with_downstream() -> Self {
        Self::spawn(|state| {
            let router = Router::new().route(
                DEFAULT_LOGOUT_PATH,
                post(|body: String| async move { format!("downstream: {body}") }),
            );
            with_backchannel_logout(router, state)
        })
        .await
    }

    async fn spawn(router: impl FnOnce(BackChannelLogoutState) -> Router) -> Self {
        let jwks_server = MockServer::start().await;
        let sessions = FaultySessions::default();

        let static_keys =
            StaticKeyProvider::new().with_key(ISSUER, VerificationKey::hmac(HMAC_SECRET));
        let jwks_keys = JwksKeyProvider::new(test::jwks::TIMEOUT, Duration::from_secs(60))
            .expect("Failed to build JWKS client")
            .with_issuer(JWKS_ISSUER, format!("{}/jwks", jwks_server.uri()));
        let keys = CompositeKeyProvider::new()
            .with_provider(Arc::new(static_keys))
            .with_provider(Arc::new(jwks_keys));

        let clients = InMemoryClientRegistry::new([
            ClientRegistration::new(CLIENT_ID, CLIENT_ID, ISSUER),
            ClientRegistration::new(JWKS_CLIENT_ID, JWKS_CLIENT_ID, JWKS_ISSUER),
        ])
        .expect("Failed to build client registry");

        let authenticator =
            LogoutTokenAuthenticator::new(JwtLogoutTokenDecoder::new(Arc::new(keys)), clients)
                .with_replay_detection(Arc::new(DashMapJtiStore::new()));
        let use_case = BackChannelLogoutUseCase::new(
            Arc::new(authenticator),
            SessionInvalidationHandler::new(Arc::new(sessions.clone())),
        );
        let state = BackChannelLogoutState::new(Arc::new(use_case));

        let listener = TcpListener::bind(test::APP_ADDRESS)
            .await
            .expect("Failed to bind test listener");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("Failed to read local address")
        );

        let router = router(state);
        tokio::spawn(async move {
            axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
                .serve(router.into_make_service())
                .await
        });

        Self {
            address,
            http_client: reqwest::Client::new(),
            sessions,
            jwks_server,
        }
    }

    pub async fn post_logout(&self, content_type: &str, body: String) -> reqwest::Response {
        self.http_client
            .post(format!("{}{}", self.address, DEFAULT_LOGOUT_PATH))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_logout_token(&self, token: &str) -> reqwest::Response {
        self.post_logout(
            "application/x-www-form-urlencoded",
            format!("logout_token={token}"),
        )
        .await
    }

    pub async fn get_health(&self) -> reqwest::Response {
        self.http_client
            .get(format!("{}/health", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register_session(
        &self,
        registration_id: &str,
        issuer: &str,
        session_id: &str,
        subject: &str,
        sid: Option<&str>,
    ) {
        let record = SessionRecord::new(SessionId::new(session_id), registration_id, issuer, subject);
        let record = match sid {
            Some(sid) => record.with_oidc_session_id(sid),
            None => record,
        };
        self.sessions
            .register(record)
            .await
            .expect("Failed to register session");
    }

    pub async fn has_session(&self, session_id: &str) -> bool {
        self.sessions.inner.contains(&SessionId::new(session_id)).await
    }

    /// Make the next `count` session lookups fail.
    pub fn fail_session_lookups(&self, count: usize) {
        self.sessions.failing_finds.store(count, Ordering::SeqCst);
    }

    /// Make every destroy of `session_id` fail.
    pub async fn make_session_stubborn(&self, session_id: &str) {
        self.sessions
            .stubborn
            .write()
            .await
            .insert(session_id.to_string());
    }
}

/// Claims of a valid logout token for session `abc` at [`ISSUER`].
pub fn logout_claims() -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "aud": [CLIENT_ID],
        "iat": now - 5,
        "exp": now + 55,
        "jti": uuid::Uuid::new_v4().to_string(),
        "sid": "abc",
        "events": { BACKCHANNEL_LOGOUT_EVENT: {} }
    })
}

pub fn sign(claims: &Value, secret: &[u8], kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &EncodingKey::from_secret(secret)).expect("Failed to sign token")
}

pub async fn error_body(response: reqwest::Response) -> Value {
    response
        .json::<Value>()
        .await
        .expect("Failed to parse error body")
}
