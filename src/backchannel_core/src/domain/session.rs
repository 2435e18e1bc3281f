use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::logout_authentication::{LogoutAuthentication, LogoutIdentifier};

/// Identifier of a local (relying-party) session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A local session established through an OIDC login.
///
/// Records carry the provider's `sub` and, when the provider issued one, its
/// `sid`, so that later logout tokens can be correlated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    session_id: SessionId,
    registration_id: String,
    issuer: String,
    subject: String,
    oidc_session_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        session_id: SessionId,
        registration_id: impl Into<String>,
        issuer: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            registration_id: registration_id.into(),
            issuer: issuer.into(),
            subject: subject.into(),
            oidc_session_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_oidc_session_id(mut self, sid: impl Into<String>) -> Self {
        self.oidc_session_id = Some(sid.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn oidc_session_id(&self) -> Option<&str> {
        self.oidc_session_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Which sessions a logout applies to.
///
/// Correlation is by `(registration, sid)` when the token carried a `sid`, and
/// by `(registration, sub)` otherwise. Never broader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCriteria {
    BySessionId {
        registration_id: String,
        sid: String,
    },
    BySubject {
        registration_id: String,
        subject: String,
    },
}

impl SessionCriteria {
    pub fn for_logout(authentication: &LogoutAuthentication) -> Self {
        let registration_id = authentication.registration().registration_id().to_owned();

        match authentication.identifier() {
            LogoutIdentifier::Session(sid) | LogoutIdentifier::Both { session: sid, .. } => {
                Self::BySessionId {
                    registration_id,
                    sid: sid.clone(),
                }
            }
            LogoutIdentifier::Subject(subject) => Self::BySubject {
                registration_id,
                subject: subject.clone(),
            },
        }
    }

    pub fn registration_id(&self) -> &str {
        match self {
            Self::BySessionId {
                registration_id, ..
            }
            | Self::BySubject {
                registration_id, ..
            } => registration_id,
        }
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        match self {
            Self::BySessionId {
                registration_id,
                sid,
            } => {
                record.registration_id() == registration_id
                    && record.oidc_session_id() == Some(sid.as_str())
            }
            Self::BySubject {
                registration_id,
                subject,
            } => record.registration_id() == registration_id && record.subject() == subject,
        }
    }
}
