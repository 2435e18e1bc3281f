use serde::{Deserialize, Serialize};

/// An identity provider this relying party is registered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientRegistration {
    registration_id: String,
    client_id: String,
    issuer: String,
}

impl ClientRegistration {
    pub fn new(
        registration_id: impl Into<String>,
        client_id: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            registration_id: registration_id.into(),
            client_id: client_id.into(),
            issuer: issuer.into(),
        }
    }

    /// Local name of the registration, used to key sessions.
    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    /// The client identifier the provider issued to us; expected in `aud`.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}
