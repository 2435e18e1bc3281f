use async_trait::async_trait;

use crate::domain::{
    error::ServiceError, invalidation::InvalidationReport,
    logout_authentication::LogoutAuthentication,
};

/// The strategy for expiring every local session a logout token points at.
///
/// Per-session failures belong in the returned report. An `Err` means the
/// sessions could not even be looked up.
#[async_trait]
pub trait LogoutHandler: Send + Sync + 'static {
    async fn logout(
        &self,
        authentication: &LogoutAuthentication,
    ) -> Result<InvalidationReport, ServiceError>;
}
