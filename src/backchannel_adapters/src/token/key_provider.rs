use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use backchannel_core::TokenDecodeError;
use jsonwebtoken::{Algorithm, DecodingKey};

/// The kind of key an algorithm verifies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    /// `None` for algorithms logout tokens are never verified with.
    pub fn of(algorithm: Algorithm) -> Option<Self> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Some(KeyFamily::Hmac),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(KeyFamily::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(KeyFamily::Ec),
            Algorithm::EdDSA => Some(KeyFamily::Ed),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

/// A key that may verify logout tokens from one issuer.
#[derive(Clone)]
pub struct VerificationKey {
    kid: Option<String>,
    family: KeyFamily,
    key: DecodingKey,
}

impl VerificationKey {
    pub fn new(kid: Option<String>, family: KeyFamily, key: DecodingKey) -> Self {
        Self { kid, family, key }
    }

    pub fn hmac(secret: &[u8]) -> Self {
        Self::new(None, KeyFamily::Hmac, DecodingKey::from_secret(secret))
    }

    pub fn rsa_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::new(None, KeyFamily::Rsa, DecodingKey::from_rsa_pem(pem)?))
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    /// Whether this key is a candidate for a token signed with `algorithm` and `kid`.
    ///
    /// A key without a `kid` is a candidate for any `kid`.
    pub fn accepts(&self, algorithm: Algorithm, kid: Option<&str>) -> bool {
        if KeyFamily::of(algorithm) != Some(self.family) {
            return false;
        }
        match (self.kid.as_deref(), kid) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => true,
        }
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

/// Source of verification keys, per issuer.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Keys for `issuer` that may have signed a token with header `kid`.
    ///
    /// `Ok(None)` means this provider does not know the issuer at all.
    async fn keys_for(
        &self,
        issuer: &str,
        kid: Option<&str>,
    ) -> Result<Option<Vec<VerificationKey>>, TokenDecodeError>;
}

/// Keys fixed at start-up, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    keys: HashMap<String, Vec<VerificationKey>>,
}

impl StaticKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, issuer: impl Into<String>, key: VerificationKey) -> Self {
        self.add_key(issuer, key);
        self
    }

    pub fn add_key(&mut self, issuer: impl Into<String>, key: VerificationKey) {
        self.keys.entry(issuer.into()).or_default().push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn keys_for(
        &self,
        issuer: &str,
        _kid: Option<&str>,
    ) -> Result<Option<Vec<VerificationKey>>, TokenDecodeError> {
        Ok(self.keys.get(issuer).cloned())
    }
}

/// Asks each provider in turn and merges what the ones that know the issuer return.
#[derive(Clone, Default)]
pub struct CompositeKeyProvider {
    providers: Vec<Arc<dyn KeyProvider>>,
}

impl CompositeKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn KeyProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

#[async_trait]
impl KeyProvider for CompositeKeyProvider {
    async fn keys_for(
        &self,
        issuer: &str,
        kid: Option<&str>,
    ) -> Result<Option<Vec<VerificationKey>>, TokenDecodeError> {
        let mut found: Option<Vec<VerificationKey>> = None;

        for provider in &self.providers {
            if let Some(keys) = provider.keys_for(issuer, kid).await? {
                found.get_or_insert_with(Vec::new).extend(keys);
            }
        }

        Ok(found)
    }
}
