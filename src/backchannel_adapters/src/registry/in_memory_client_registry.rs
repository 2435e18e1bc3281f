use std::{collections::HashMap, sync::Arc};

use backchannel_core::{ClientRegistration, ClientRegistrationRepository, ClientRegistryError};

use crate::config::ClientSettings;

/// Identity-provider registrations, fixed at start-up and keyed by issuer.
#[derive(Debug, Default, Clone)]
pub struct InMemoryClientRegistry {
    by_issuer: Arc<HashMap<String, ClientRegistration>>,
}

impl InMemoryClientRegistry {
    pub fn new(
        registrations: impl IntoIterator<Item = ClientRegistration>,
    ) -> Result<Self, ClientRegistryError> {
        let mut by_issuer = HashMap::new();
        for registration in registrations {
            let issuer = registration.issuer().to_owned();
            if by_issuer.insert(issuer.clone(), registration).is_some() {
                return Err(ClientRegistryError::DuplicateIssuer(issuer));
            }
        }

        Ok(Self {
            by_issuer: Arc::new(by_issuer),
        })
    }

    pub fn from_settings(clients: &[ClientSettings]) -> Result<Self, ClientRegistryError> {
        Self::new(clients.iter().map(|client| {
            ClientRegistration::new(
                client.registration_id.as_str(),
                client.client_id.as_str(),
                client.issuer.as_str(),
            )
        }))
    }

    pub fn len(&self) -> usize {
        self.by_issuer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_issuer.is_empty()
    }
}

#[async_trait::async_trait]
impl ClientRegistrationRepository for InMemoryClientRegistry {
    async fn find_by_issuer(
        &self,
        issuer: &str,
    ) -> Result<Option<ClientRegistration>, ClientRegistryError> {
        Ok(self.by_issuer.get(issuer).cloned())
    }
}
