use super::session::SessionId;

/// What happened to a single matched session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationOutcome {
    Invalidated,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInvalidation {
    session_id: SessionId,
    outcome: InvalidationOutcome,
}

impl SessionInvalidation {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn outcome(&self) -> &InvalidationOutcome {
        &self.outcome
    }

    pub fn is_invalidated(&self) -> bool {
        matches!(self.outcome, InvalidationOutcome::Invalidated)
    }
}

/// Per-session results of one back-channel logout.
///
/// The report is advisory: the identity provider always receives 200 once the
/// token is accepted. Embedding applications read it from the response
/// extensions or from the tracing events emitted while it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    entries: Vec<SessionInvalidation>,
}

impl InvalidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_invalidated(&mut self, session_id: SessionId) {
        self.entries.push(SessionInvalidation {
            session_id,
            outcome: InvalidationOutcome::Invalidated,
        });
    }

    pub fn record_failure(&mut self, session_id: SessionId, reason: impl Into<String>) {
        self.entries.push(SessionInvalidation {
            session_id,
            outcome: InvalidationOutcome::Failed {
                reason: reason.into(),
            },
        });
    }

    pub fn entries(&self) -> &[SessionInvalidation] {
        &self.entries
    }

    pub fn invalidated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_invalidated()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.invalidated_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SessionInvalidation> {
        self.entries.iter().filter(|e| !e.is_invalidated())
    }

    /// No session matched the logout token.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }
}
