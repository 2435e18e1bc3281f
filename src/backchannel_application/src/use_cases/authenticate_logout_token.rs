use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;

use backchannel_core::{
    BackChannelLogoutError, ClientRegistrationRepository, InvalidTokenReason, JtiStore,
    LogoutAuthentication, LogoutAuthenticationManager, LogoutIdentifier, LogoutTokenDecoder,
    LogoutTokenRequest, ServiceError, TokenDecodeError,
};

pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 60;

/// Validates logout tokens against the back-channel logout rules.
///
/// Checks run in a fixed order and stop at the first failure: signature,
/// issuer, audience, `iat`, `exp`, `jti`, `events`, `nonce`, `sub`/`sid`, and
/// finally replay detection when a [`JtiStore`] is configured.
pub struct LogoutTokenAuthenticator<D, C>
where
    D: LogoutTokenDecoder,
    C: ClientRegistrationRepository,
{
    decoder: D,
    clients: C,
    jti_store: Option<Arc<dyn JtiStore>>,
    clock_skew: Duration,
}

impl<D, C> LogoutTokenAuthenticator<D, C>
where
    D: LogoutTokenDecoder,
    C: ClientRegistrationRepository,
{
    pub fn new(decoder: D, clients: C) -> Self {
        Self {
            decoder,
            clients,
            jti_store: None,
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS),
        }
    }

    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    pub fn with_replay_detection(mut self, jti_store: Arc<dyn JtiStore>) -> Self {
        self.jti_store = Some(jti_store);
        self
    }

    /// Validate `request` as of `now`.
    pub async fn authenticate_at(
        &self,
        request: &LogoutTokenRequest,
        now: DateTime<Utc>,
    ) -> Result<LogoutAuthentication, BackChannelLogoutError> {
        let claims = self
            .decoder
            .decode(request.token().expose_secret())
            .await
            .map_err(decode_error)?;

        let issuer = claims.issuer().ok_or(InvalidTokenReason::UnknownIssuer)?;
        let registration = self
            .clients
            .find_by_issuer(issuer)
            .await
            .map_err(|e| ServiceError::new("client registry lookup failed", e))?
            .ok_or(InvalidTokenReason::UnknownIssuer)?;

        if !claims
            .audiences()
            .any(|audience| audience == registration.client_id())
        {
            return Err(InvalidTokenReason::AudienceMismatch.into());
        }

        let issued_at = claims.issued_at().ok_or(InvalidTokenReason::MissingIssuedAt)?;
        if issued_at > (now + self.clock_skew).timestamp() {
            return Err(InvalidTokenReason::IssuedInFuture.into());
        }

        let expires_at = claims.expires_at().ok_or(InvalidTokenReason::MissingExpiry)?;
        if expires_at <= (now - self.clock_skew).timestamp() {
            return Err(InvalidTokenReason::Expired.into());
        }

        let jti = claims.jti().ok_or(InvalidTokenReason::MissingJti)?;

        if !claims.has_logout_event() {
            return Err(InvalidTokenReason::MissingLogoutEvent.into());
        }

        if claims.has_nonce() {
            return Err(InvalidTokenReason::NonceForbidden.into());
        }

        let identifier = LogoutIdentifier::from_claims(claims.subject(), claims.session_id())
            .ok_or(InvalidTokenReason::MissingSubjectAndSession)?;

        if let Some(jti_store) = &self.jti_store {
            let expires_at = DateTime::from_timestamp(expires_at, 0)
                .and_then(|expires_at| expires_at.checked_add_signed(self.clock_skew))
                .ok_or(InvalidTokenReason::Malformed)?;
            let first_seen = jti_store
                .record_if_absent(issuer, jti, expires_at)
                .await
                .map_err(|e| ServiceError::new("replay store unavailable", e))?;
            if !first_seen {
                return Err(InvalidTokenReason::Replayed.into());
            }
        }

        Ok(LogoutAuthentication::new(identifier, registration, jti))
    }
}

fn decode_error(error: TokenDecodeError) -> BackChannelLogoutError {
    match error {
        TokenDecodeError::Malformed(_) => InvalidTokenReason::Malformed.into(),
        TokenDecodeError::InvalidSignature | TokenDecodeError::UnsupportedAlgorithm(_) => {
            InvalidTokenReason::InvalidSignature.into()
        }
        TokenDecodeError::UnknownIssuer(_) => InvalidTokenReason::UnknownIssuer.into(),
        e @ TokenDecodeError::KeySourceUnavailable(_) => {
            ServiceError::new("logout token keys unavailable", e).into()
        }
    }
}

#[async_trait]
impl<D, C> LogoutAuthenticationManager for LogoutTokenAuthenticator<D, C>
where
    D: LogoutTokenDecoder + 'static,
    C: ClientRegistrationRepository + 'static,
{
    #[tracing::instrument(name = "LogoutTokenAuthenticator::authenticate", skip_all)]
    async fn authenticate(
        &self,
        request: LogoutTokenRequest,
    ) -> Result<LogoutAuthentication, BackChannelLogoutError> {
        self.authenticate_at(&request, Utc::now())
            .await
            .inspect(|authentication| {
                tracing::debug!(
                    issuer = authentication.registration().issuer(),
                    jti = authentication.jti(),
                    "Logout token accepted"
                )
            })
            .inspect_err(|e| match e {
                BackChannelLogoutError::Service(e) => {
                    tracing::error!(error = %e, "Logout token could not be validated")
                }
                e => tracing::debug!(reason = %e, "Logout token rejected"),
            })
    }

    #[tracing::instrument(
        name = "LogoutTokenAuthenticator::abandon",
        skip_all,
        fields(jti = authentication.jti())
    )]
    async fn abandon(&self, authentication: &LogoutAuthentication) {
        let Some(jti_store) = &self.jti_store else {
            return;
        };

        if let Err(e) = jti_store
            .forget(authentication.registration().issuer(), authentication.jti())
            .await
        {
            tracing::warn!(error = %e, "Failed to release logout token for retry");
        }
    }
}
