use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use backchannel_core::TokenDecodeError;
use dashmap::DashMap;
use jsonwebtoken::{
    DecodingKey,
    jwk::{AlgorithmParameters, Jwk, JwkSet, PublicKeyUse},
};
use reqwest::Client;

use super::key_provider::{KeyFamily, KeyProvider, VerificationKey};

const DEFAULT_REFETCH_COOLDOWN: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct CachedKeys {
    fetched_at: Instant,
    expires_at: Instant,
    keys: Arc<Vec<VerificationKey>>,
}

/// Fetches each issuer's JSON Web Key Set over HTTP and caches it.
///
/// An unknown `kid` triggers a refetch, at most once per cooldown. When a
/// refresh fails, stale keys are served if there are any.
#[derive(Clone)]
pub struct JwksKeyProvider {
    http: Client,
    jwks_uris: HashMap<String, String>,
    cache: Arc<DashMap<String, CachedKeys>>,
    cache_ttl: Duration,
    refetch_cooldown: Duration,
}

impl JwksKeyProvider {
    pub fn new(timeout: Duration, cache_ttl: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            jwks_uris: HashMap::new(),
            cache: Arc::new(DashMap::new()),
            cache_ttl,
            refetch_cooldown: DEFAULT_REFETCH_COOLDOWN,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>, jwks_uri: impl Into<String>) -> Self {
        self.jwks_uris.insert(issuer.into(), jwks_uri.into());
        self
    }

    pub fn with_refetch_cooldown(mut self, refetch_cooldown: Duration) -> Self {
        self.refetch_cooldown = refetch_cooldown;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.jwks_uris.is_empty()
    }

    #[tracing::instrument(name = "JwksKeyProvider::refresh", skip(self))]
    async fn refresh(
        &self,
        issuer: &str,
        jwks_uri: &str,
    ) -> Result<Arc<Vec<VerificationKey>>, TokenDecodeError> {
        match fetch_jwks(&self.http, jwks_uri).await {
            Ok(jwks) => {
                let keys = Arc::new(verification_keys(&jwks));
                let now = Instant::now();
                self.cache.insert(
                    issuer.to_owned(),
                    CachedKeys {
                        fetched_at: now,
                        expires_at: now + self.cache_ttl,
                        keys: Arc::clone(&keys),
                    },
                );
                tracing::debug!(keys = keys.len(), "Fetched JWKS");
                Ok(keys)
            }
            Err(e) => {
                if let Some(entry) = self.cache.get(issuer) {
                    tracing::warn!(
                        error = %e,
                        fetched_ms_ago = entry.fetched_at.elapsed().as_millis() as u64,
                        "JWKS refresh failed, using cached keys"
                    );
                    return Ok(Arc::clone(&entry.keys));
                }
                tracing::error!(error = %e, "JWKS fetch failed");
                Err(TokenDecodeError::KeySourceUnavailable(e))
            }
        }
    }
}

#[async_trait]
impl KeyProvider for JwksKeyProvider {
    async fn keys_for(
        &self,
        issuer: &str,
        kid: Option<&str>,
    ) -> Result<Option<Vec<VerificationKey>>, TokenDecodeError> {
        let Some(jwks_uri) = self.jwks_uris.get(issuer) else {
            return Ok(None);
        };

        let cached = self.cache.get(issuer).map(|entry| entry.clone());
        if let Some(entry) = cached {
            let fresh = Instant::now() <= entry.expires_at;
            let knows_kid = kid.is_none_or(|kid| entry.keys.iter().any(|k| k.kid() == Some(kid)));
            let may_refetch = entry.fetched_at.elapsed() >= self.refetch_cooldown;

            if fresh && (knows_kid || !may_refetch) {
                return Ok(Some(entry.keys.to_vec()));
            }
        }

        let keys = self.refresh(issuer, jwks_uri).await?;
        Ok(Some(keys.to_vec()))
    }
}

async fn fetch_jwks(http: &Client, jwks_uri: &str) -> Result<JwkSet, String> {
    let resp = http.get(jwks_uri).send().await.map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        return Err(format!("GET {} returned {}", jwks_uri, resp.status()));
    }

    resp.json::<JwkSet>().await.map_err(|e| e.to_string())
}

fn verification_keys(jwks: &JwkSet) -> Vec<VerificationKey> {
    jwks.keys
        .iter()
        .filter(|jwk| !matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)))
        .filter_map(|jwk| match verification_key(jwk) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(kid = ?jwk.common.key_id, error = %e, "Skipping unusable JWK");
                None
            }
        })
        .collect()
}

fn verification_key(jwk: &Jwk) -> Result<Option<VerificationKey>, jsonwebtoken::errors::Error> {
    let family = match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => KeyFamily::Rsa,
        AlgorithmParameters::EllipticCurve(_) => KeyFamily::Ec,
        AlgorithmParameters::OctetKeyPair(_) => KeyFamily::Ed,
        AlgorithmParameters::OctetKey(_) => KeyFamily::Hmac,
        #[allow(unreachable_patterns)]
        _ => return Ok(None),
    };

    Ok(Some(VerificationKey::new(
        jwk.common.key_id.clone(),
        family,
        DecodingKey::from_jwk(jwk)?,
    )))
}
