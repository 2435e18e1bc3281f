use super::client_registration::ClientRegistration;

/// A logout token must name a subject, a provider session, or both.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum LogoutIdentifier {
    /// Both the `sub` and `sid` claims are present
    Both { subject: String, session: String },
    /// Only the `sid` claim is present
    Session(String),
    /// Only the `sub` claim is present
    Subject(String),
}

impl LogoutIdentifier {
    /// Returns `None` when neither correlator is present.
    pub fn from_claims(subject: Option<&str>, session: Option<&str>) -> Option<Self> {
        match (subject, session) {
            (Some(subject), Some(session)) => Some(Self::Both {
                subject: subject.to_owned(),
                session: session.to_owned(),
            }),
            (None, Some(session)) => Some(Self::Session(session.to_owned())),
            (Some(subject), None) => Some(Self::Subject(subject.to_owned())),
            (None, None) => None,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Subject(subject) | Self::Both { subject, .. } => Some(subject),
            Self::Session(_) => None,
        }
    }

    pub fn session(&self) -> Option<&str> {
        match self {
            Self::Session(session) | Self::Both { session, .. } => Some(session),
            Self::Subject(_) => None,
        }
    }
}

/// The trusted outcome of validating a logout token.
///
/// Only produced after every validation rule passed. Consumed by the logout
/// handler and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutAuthentication {
    identifier: LogoutIdentifier,
    registration: ClientRegistration,
    jti: String,
}

impl LogoutAuthentication {
    pub fn new(
        identifier: LogoutIdentifier,
        registration: ClientRegistration,
        jti: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            registration,
            jti: jti.into(),
        }
    }

    pub fn identifier(&self) -> &LogoutIdentifier {
        &self.identifier
    }

    pub fn subject(&self) -> Option<&str> {
        self.identifier.subject()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.identifier.session()
    }

    pub fn registration(&self) -> &ClientRegistration {
        &self.registration
    }

    pub fn jti(&self) -> &str {
        &self.jti
    }
}
