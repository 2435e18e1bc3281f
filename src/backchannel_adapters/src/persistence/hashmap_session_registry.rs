use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use backchannel_core::{
    SessionCriteria, SessionId, SessionRecord, SessionRegistry, SessionRegistryError,
};

#[derive(Default, Clone)]
pub struct HashMapSessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl HashMapSessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl SessionRegistry for HashMapSessionRegistry {
    async fn register(&self, record: SessionRecord) -> Result<(), SessionRegistryError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.session_id().clone(), record);
        Ok(())
    }

    async fn find(
        &self,
        criteria: &SessionCriteria,
    ) -> Result<Vec<SessionRecord>, SessionRegistryError> {
        let sessions = self.sessions.read().await;
        let mut matched: Vec<SessionRecord> = sessions
            .values()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.session_id().cmp(b.session_id()));
        Ok(matched)
    }

    async fn destroy(&self, record: &SessionRecord) -> Result<(), SessionRegistryError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(record.session_id());
        Ok(())
    }
}
