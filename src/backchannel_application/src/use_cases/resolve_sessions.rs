use std::sync::Arc;

use backchannel_core::{
    LogoutAuthentication, ServiceError, SessionCriteria, SessionRecord, SessionRegistry,
};

/// The local sessions correlated with one logout token.
///
/// Single pass. Every record has already been checked against the criteria it
/// was resolved for.
#[derive(Debug)]
pub struct SessionMatches {
    records: std::vec::IntoIter<SessionRecord>,
}

impl SessionMatches {
    fn new(records: Vec<SessionRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Iterator for SessionMatches {
    type Item = SessionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for SessionMatches {}

/// Finds the local sessions a validated logout token applies to.
#[derive(Clone)]
pub struct SessionCorrelationResolver {
    sessions: Arc<dyn SessionRegistry>,
}

impl SessionCorrelationResolver {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { sessions }
    }

    #[tracing::instrument(
        name = "SessionCorrelationResolver::resolve",
        skip_all,
        fields(registration_id = authentication.registration().registration_id())
    )]
    pub async fn resolve(
        &self,
        authentication: &LogoutAuthentication,
    ) -> Result<SessionMatches, ServiceError> {
        let criteria = SessionCriteria::for_logout(authentication);

        let candidates = self
            .sessions
            .find(&criteria)
            .await
            .map_err(|e| ServiceError::new("session lookup failed", e))?;

        // Stores may over-match, never under-match
        let matched: Vec<SessionRecord> = candidates
            .into_iter()
            .filter(|record| criteria.matches(record))
            .collect();

        tracing::debug!(matched = matched.len(), "Resolved sessions for logout");

        Ok(SessionMatches::new(matched))
    }
}
