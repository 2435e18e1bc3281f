//! The logout token as it arrives from the identity provider.
//!
//! [`LogoutTokenClaims`] is deliberately permissive: every registered claim is
//! optional so that the authenticator can report *which* rule a token broke,
//! in the order the back-channel logout validation rules are listed.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The member that must appear in the `events` claim of every logout token.
pub const BACKCHANNEL_LOGOUT_EVENT: &str = "http://schemas.openid.net/event/backchannel-logout";

/// A raw, unverified logout token extracted from a request.
#[derive(Debug, Clone)]
pub struct LogoutTokenRequest {
    token: Secret<String>,
}

impl LogoutTokenRequest {
    pub fn new(token: Secret<String>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &Secret<String> {
        &self.token
    }
}

impl From<String> for LogoutTokenRequest {
    fn from(token: String) -> Self {
        Self::new(Secret::new(token))
    }
}

impl PartialEq for LogoutTokenRequest {
    fn eq(&self, other: &Self) -> bool {
        self.token.expose_secret() == other.token.expose_secret()
    }
}

/// Claims of a decoded logout token. Not yet trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutTokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    aud: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    events: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<Value>,
    #[serde(flatten)]
    additional_claims: Map<String, Value>,
}

impl LogoutTokenClaims {
    /// The `iss` claim
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// The `aud` claim, normalized to a list
    pub fn audiences(&self) -> impl Iterator<Item = &str> {
        self.aud.iter().map(String::as_str)
    }

    /// The `iat` claim in seconds since the epoch
    pub fn issued_at(&self) -> Option<i64> {
        self.iat
    }

    /// The `exp` claim in seconds since the epoch
    pub fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    pub fn jti(&self) -> Option<&str> {
        self.jti.as_deref().filter(|jti| !jti.is_empty())
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|sub| !sub.is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.sid.as_deref().filter(|sid| !sid.is_empty())
    }

    pub fn events(&self) -> Option<&Map<String, Value>> {
        self.events.as_ref()
    }

    /// Whether `events` carries the back-channel logout member as a JSON object.
    ///
    /// The object may be empty, and other events may sit beside it.
    pub fn has_logout_event(&self) -> bool {
        self.events
            .as_ref()
            .and_then(|events| events.get(BACKCHANNEL_LOGOUT_EVENT))
            .is_some_and(Value::is_object)
    }

    pub fn has_nonce(&self) -> bool {
        self.nonce.is_some()
    }

    pub fn additional_claims(&self) -> &Map<String, Value> {
        &self.additional_claims
    }
}

fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringOrVec>::deserialize(deserializer)? {
        Some(StringOrVec::One(single)) => vec![single],
        Some(StringOrVec::Many(many)) => many,
        None => Vec::new(),
    })
}
