use backchannel_core::{
    SessionCriteria, SessionId, SessionRecord, SessionRegistry, SessionRegistryError,
};
use chrono::DateTime;
use sqlx::{PgPool, Row, postgres::PgRow};

/// Sessions in the `oidc_sessions` table.
#[derive(Clone)]
pub struct PostgresSessionRegistry {
    pool: PgPool,
}

impl PostgresSessionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT session_id, registration_id, issuer, subject, oidc_session_id, created_at FROM oidc_sessions";

#[async_trait::async_trait]
impl SessionRegistry for PostgresSessionRegistry {
    #[tracing::instrument(name = "Registering session in PostgreSQL", skip_all)]
    async fn register(&self, record: SessionRecord) -> Result<(), SessionRegistryError> {
        sqlx::query(
            r#"
            INSERT INTO oidc_sessions
                (session_id, registration_id, issuer, subject, oidc_session_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO UPDATE SET
                registration_id = EXCLUDED.registration_id,
                issuer = EXCLUDED.issuer,
                subject = EXCLUDED.subject,
                oidc_session_id = EXCLUDED.oidc_session_id,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(record.session_id().as_str())
        .bind(record.registration_id())
        .bind(record.issuer())
        .bind(record.subject())
        .bind(record.oidc_session_id())
        .bind(record.created_at().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument(name = "Finding sessions in PostgreSQL", skip_all)]
    async fn find(
        &self,
        criteria: &SessionCriteria,
    ) -> Result<Vec<SessionRecord>, SessionRegistryError> {
        let (column, registration_id, value) = match criteria {
            SessionCriteria::BySessionId {
                registration_id,
                sid,
            } => ("oidc_session_id", registration_id, sid),
            SessionCriteria::BySubject {
                registration_id,
                subject,
            } => ("subject", registration_id, subject),
        };
        let sql = format!(
            "{SELECT_COLUMNS} WHERE registration_id = $1 AND {column} = $2 ORDER BY session_id"
        );

        let rows = sqlx::query(&sql)
            .bind(registration_id)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.iter().map(from_row).collect()
    }

    #[tracing::instrument(name = "Deleting session from PostgreSQL", skip_all)]
    async fn destroy(&self, record: &SessionRecord) -> Result<(), SessionRegistryError> {
        sqlx::query("DELETE FROM oidc_sessions WHERE session_id = $1")
            .bind(record.session_id().as_str())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> SessionRegistryError {
    SessionRegistryError::Unavailable(e.to_string())
}

fn from_row(row: &PgRow) -> Result<SessionRecord, SessionRegistryError> {
    let corrupt = |e: sqlx::Error| SessionRegistryError::CorruptRecord(e.to_string());

    let session_id: String = row.try_get("session_id").map_err(corrupt)?;
    let registration_id: String = row.try_get("registration_id").map_err(corrupt)?;
    let issuer: String = row.try_get("issuer").map_err(corrupt)?;
    let subject: String = row.try_get("subject").map_err(corrupt)?;
    let oidc_session_id: Option<String> = row.try_get("oidc_session_id").map_err(corrupt)?;
    let created_at_millis: i64 = row.try_get("created_at").map_err(corrupt)?;

    let created_at = DateTime::from_timestamp_millis(created_at_millis).ok_or_else(|| {
        SessionRegistryError::CorruptRecord(format!("session {session_id} has a bad created_at"))
    })?;

    let record = SessionRecord::new(SessionId::new(session_id), registration_id, issuer, subject)
        .with_created_at(created_at);

    Ok(match oidc_session_id {
        Some(sid) => record.with_oidc_session_id(sid),
        None => record,
    })
}
