use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use backchannel_core::{JtiStore, JtiStoreError};
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};

const PURGE_EVERY: usize = 256;

/// Process-local replay detection.
///
/// Entries live until the token's expiry and are purged lazily.
#[derive(Clone, Default)]
pub struct DashMapJtiStore {
    seen: Arc<DashMap<(String, String), DateTime<Utc>>>,
    inserts: Arc<AtomicUsize>,
}

impl DashMapJtiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.seen.retain(|_, expires_at| *expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn record_if_absent_at(
        &self,
        issuer: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.inserts.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            self.purge_expired(now);
        }

        match self.seen.entry((issuer.to_owned(), jti.to_owned())) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return false;
                }
                entry.insert(expires_at);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        }
    }
}

#[async_trait::async_trait]
impl JtiStore for DashMapJtiStore {
    async fn record_if_absent(
        &self,
        issuer: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, JtiStoreError> {
        Ok(self.record_if_absent_at(issuer, jti, expires_at, Utc::now()))
    }

    async fn forget(&self, issuer: &str, jti: &str) -> Result<(), JtiStoreError> {
        self.seen.remove(&(issuer.to_owned(), jti.to_owned()));
        Ok(())
    }
}
