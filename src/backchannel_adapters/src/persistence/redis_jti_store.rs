use backchannel_core::{JtiStore, JtiStoreError};
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::MultiplexedConnection};

/// Replay detection shared between service instances.
///
/// Relies on `SET NX EX` so the first-sighting check and the insert are one
/// atomic step on the server.
#[derive(Clone)]
pub struct RedisJtiStore {
    conn: MultiplexedConnection,
}

impl RedisJtiStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl JtiStore for RedisJtiStore {
    async fn record_if_absent(
        &self,
        issuer: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, JtiStoreError> {
        let ttl = ttl_seconds(expires_at, Utc::now());
        let mut conn = self.conn.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(get_key(issuer, jti))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(|e| JtiStoreError::Unavailable(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn forget(&self, issuer: &str, jti: &str) -> Result<(), JtiStoreError> {
        let mut conn = self.conn.clone();

        let _: () = conn
            .del(get_key(issuer, jti))
            .await
            .map_err(|e| JtiStoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

const LOGOUT_JTI_KEY_PREFIX: &str = "logout_jti:";

// The issuer length keeps ("a:b", "c") and ("a", "b:c") apart
fn get_key(issuer: &str, jti: &str) -> String {
    format!("{}{}:{}{}", LOGOUT_JTI_KEY_PREFIX, issuer.len(), issuer, jti)
}

fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (expires_at - now).num_seconds().max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn keys_do_not_collide_across_issuers() {
        assert_ne!(get_key("a:b", "c"), get_key("a", "b:c"));
        assert_eq!(
            get_key("https://idp.example", "t1"),
            "logout_jti:19:https://idp.examplet1"
        );
    }

    #[test]
    fn ttl_is_never_zero() {
        let now = Utc::now();

        assert_eq!(ttl_seconds(now + Duration::seconds(90), now), 90);
        assert_eq!(ttl_seconds(now - Duration::seconds(5), now), 1);
    }
}
