use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use backchannel_core::{
    InvalidationReport, LogoutAuthentication, LogoutHandler, ServiceError, SessionRecord,
    SessionRegistry,
};

use super::resolve_sessions::SessionCorrelationResolver;

/// Destroys every local session correlated with a logout token.
///
/// Destruction runs on its own task: once started it completes even if the
/// caller goes away. One failed destroy never stops the others.
#[derive(Clone)]
pub struct SessionInvalidationHandler {
    resolver: SessionCorrelationResolver,
    sessions: Arc<dyn SessionRegistry>,
}

impl SessionInvalidationHandler {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self {
            resolver: SessionCorrelationResolver::new(Arc::clone(&sessions)),
            sessions,
        }
    }

    async fn destroy_all(
        sessions: Arc<dyn SessionRegistry>,
        records: Vec<SessionRecord>,
    ) -> InvalidationReport {
        let mut report = InvalidationReport::new();

        for record in records {
            let session_id = record.session_id().clone();
            match sessions.destroy(&record).await {
                Ok(()) => report.record_invalidated(session_id),
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %e,
                        "Failed to invalidate session"
                    );
                    report.record_failure(session_id, e.to_string());
                }
            }
        }

        report
    }
}

#[async_trait]
impl LogoutHandler for SessionInvalidationHandler {
    #[tracing::instrument(
        name = "SessionInvalidationHandler::logout",
        skip_all,
        fields(jti = authentication.jti())
    )]
    async fn logout(
        &self,
        authentication: &LogoutAuthentication,
    ) -> Result<InvalidationReport, ServiceError> {
        let records: Vec<SessionRecord> = self.resolver.resolve(authentication).await?.collect();

        let task = tokio::spawn(
            Self::destroy_all(Arc::clone(&self.sessions), records).in_current_span(),
        );
        let report = task
            .await
            .map_err(|e| ServiceError::new("session invalidation task failed", e))?;

        tracing::info!(
            invalidated = report.invalidated_count(),
            failed = report.failure_count(),
            "Back-channel logout processed"
        );

        Ok(report)
    }
}
