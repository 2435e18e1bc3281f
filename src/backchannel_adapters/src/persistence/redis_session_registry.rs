use std::collections::HashMap;

use backchannel_core::{
    SessionCriteria, SessionId, SessionRecord, SessionRegistry, SessionRegistryError,
};
use chrono::DateTime;
use redis::{AsyncCommands, aio::MultiplexedConnection};

/// Sessions stored as one hash per session, plus a set per correlator.
///
/// ```text
/// oidc_session:{id}                    -> hash of the record
/// oidc_session_sub:{registration}:{sub} -> set of session ids
/// oidc_session_sid:{registration}:{sid} -> set of session ids
/// ```
#[derive(Clone)]
pub struct RedisSessionRegistry {
    conn: MultiplexedConnection,
}

impl RedisSessionRegistry {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl SessionRegistry for RedisSessionRegistry {
    async fn register(&self, record: SessionRecord) -> Result<(), SessionRegistryError> {
        let session_id = record.session_id().as_str();
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset_multiple(session_key(session_id), to_fields(&record).as_slice())
            .ignore()
            .sadd(
                subject_index_key(record.registration_id(), record.subject()),
                session_id,
            )
            .ignore();
        if let Some(sid) = record.oidc_session_id() {
            pipe.sadd(sid_index_key(record.registration_id(), sid), session_id)
                .ignore();
        }

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn find(
        &self,
        criteria: &SessionCriteria,
    ) -> Result<Vec<SessionRecord>, SessionRegistryError> {
        let index = match criteria {
            SessionCriteria::BySessionId {
                registration_id,
                sid,
            } => sid_index_key(registration_id, sid),
            SessionCriteria::BySubject {
                registration_id,
                subject,
            } => subject_index_key(registration_id, subject),
        };
        let mut conn = self.conn.clone();

        let mut session_ids: Vec<String> = conn.smembers(&index).await.map_err(unavailable)?;
        session_ids.sort();

        let mut records = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            let fields: HashMap<String, String> = conn
                .hgetall(session_key(&session_id))
                .await
                .map_err(unavailable)?;

            if fields.is_empty() {
                // Index entry outlived its session
                let _: () = conn
                    .srem(&index, &session_id)
                    .await
                    .map_err(unavailable)?;
                continue;
            }

            records.push(from_fields(session_id, fields)?);
        }

        Ok(records)
    }

    async fn destroy(&self, record: &SessionRecord) -> Result<(), SessionRegistryError> {
        let session_id = record.session_id().as_str();
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(session_key(session_id))
            .ignore()
            .srem(
                subject_index_key(record.registration_id(), record.subject()),
                session_id,
            )
            .ignore();
        if let Some(sid) = record.oidc_session_id() {
            pipe.srem(sid_index_key(record.registration_id(), sid), session_id)
                .ignore();
        }

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }
}

const SESSION_KEY_PREFIX: &str = "oidc_session:";
const SUBJECT_INDEX_KEY_PREFIX: &str = "oidc_session_sub:";
const SID_INDEX_KEY_PREFIX: &str = "oidc_session_sid:";

fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, session_id)
}

fn subject_index_key(registration_id: &str, subject: &str) -> String {
    format!(
        "{}{}:{}{}",
        SUBJECT_INDEX_KEY_PREFIX,
        registration_id.len(),
        registration_id,
        subject
    )
}

fn sid_index_key(registration_id: &str, sid: &str) -> String {
    format!(
        "{}{}:{}{}",
        SID_INDEX_KEY_PREFIX,
        registration_id.len(),
        registration_id,
        sid
    )
}

fn unavailable(e: redis::RedisError) -> SessionRegistryError {
    SessionRegistryError::Unavailable(e.to_string())
}

fn to_fields(record: &SessionRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("registration_id", record.registration_id().to_owned()),
        ("issuer", record.issuer().to_owned()),
        ("subject", record.subject().to_owned()),
        ("created_at", record.created_at().timestamp_millis().to_string()),
    ];
    if let Some(sid) = record.oidc_session_id() {
        fields.push(("sid", sid.to_owned()));
    }
    fields
}

fn from_fields(
    session_id: String,
    mut fields: HashMap<String, String>,
) -> Result<SessionRecord, SessionRegistryError> {
    let mut take = |name: &str| {
        fields.remove(name).ok_or_else(|| {
            SessionRegistryError::CorruptRecord(format!("session {session_id} has no {name}"))
        })
    };

    let registration_id = take("registration_id")?;
    let issuer = take("issuer")?;
    let subject = take("subject")?;
    let created_at = take("created_at")?
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| {
            SessionRegistryError::CorruptRecord(format!("session {session_id} has a bad created_at"))
        })?;
    let sid = fields.remove("sid");

    let record = SessionRecord::new(SessionId::new(session_id), registration_id, issuer, subject)
        .with_created_at(created_at);

    Ok(match sid {
        Some(sid) => record.with_oidc_session_id(sid),
        None => record,
    })
}
