// src/services/ledger_service.rs

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use livedesk_common::models::{LedgerUpdate, VisitorFilter, VisitorRecord};
use livedesk_common::traits::LivechatRepository;

use crate::Error;
use crate::utils::names::random_animal_name;

/// Version-checked writes are retried this many times before giving up.
pub const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// The only writer of visitor records.
///
/// Updates to one visitor are serialized twice over: an in-process async lock
/// per visitor id, and a compare-and-swap on the stored version that catches
/// writers in other processes.
pub struct LedgerService {
    repo: Arc<dyn LivechatRepository>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// One visitor's entry in the lock table. Dropping the slot, including when
/// the update future is cancelled mid-await, removes the entry once no other
/// caller holds or waits on it.
struct LockSlot<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl<'a> LockSlot<'a> {
    fn acquire(locks: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let lock = locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self { locks, key, lock }
    }
}

impl Drop for LockSlot<'_> {
    fn drop(&mut self) {
        // the map and this slot are the only owners left
        self.locks
            .remove_if(self.key, |_, l| Arc::strong_count(l) == 2);
    }
}

impl LedgerService {
    pub fn new(repo: Arc<dyn LivechatRepository>) -> Self {
        Self {
            repo,
            locks: DashMap::new(),
        }
    }

    pub async fn get(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, Error> {
        self.repo.get(visitor_id).await
    }

    /// Like `get`, but a missing visitor is `Error::NotFound`.
    pub async fn get_required(&self, visitor_id: &str) -> Result<VisitorRecord, Error> {
        self.repo
            .get(visitor_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("visitor '{visitor_id}'")))
    }

    pub async fn list(&self, filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error> {
        self.repo.list(filter).await
    }

    /// Applies `update` atomically, creating the record on first contact.
    pub async fn update(&self, visitor_id: &str, update: LedgerUpdate) -> Result<VisitorRecord, Error> {
        let slot = LockSlot::acquire(&self.locks, visitor_id);
        let _guard = slot.lock.lock().await;
        self.update_with_retry(visitor_id, update).await
    }

    async fn update_with_retry(
        &self,
        visitor_id: &str,
        update: LedgerUpdate,
    ) -> Result<VisitorRecord, Error> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let now = Utc::now();
            let (mut record, is_new) = match self.repo.get(visitor_id).await? {
                Some(existing) => (existing, false),
                None => (VisitorRecord::new(visitor_id, &random_animal_name(), now), true),
            };

            let expected_version = record.version;
            let changed = record.apply(update.clone(), now);
            if !changed && !is_new {
                return Ok(record);
            }
            record.version = expected_version + 1;

            let written = if is_new {
                self.repo.insert(&record).await?
            } else {
                self.repo.replace(&record, expected_version).await?
            };

            if written {
                if is_new {
                    info!(
                        "Created livechat record for visitor '{}' as '{}'",
                        visitor_id,
                        record.display_name()
                    );
                }
                debug!("Visitor '{}' now at version {}", visitor_id, record.version);
                return Ok(record);
            }

            warn!(
                "Concurrent update on visitor '{}' (attempt {}/{})",
                visitor_id, attempt, MAX_UPDATE_ATTEMPTS
            );
        }

        Err(Error::ConcurrentUpdateConflict {
            visitor_id: visitor_id.to_string(),
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryLivechatRepository;
    use async_trait::async_trait;
    use livedesk_common::models::{SenderType, TranscriptMessage};

    #[tokio::test]
    async fn test_lazy_creation_with_defaults() {
        let ledger = LedgerService::new(Arc::new(InMemoryLivechatRepository::new()));
        let rec = ledger.update("new-visitor", LedgerUpdate::default()).await.unwrap();

        assert_eq!(rec.version, 1);
        assert!(!rec.enabled && !rec.online && !rec.visible);
        assert_eq!(rec.user_metadata["lifecycle_stage"], "subscriber");
        assert!(rec.display_name().contains(' '));
        assert!(ledger.get("new-visitor").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_linearized() {
        let ledger = Arc::new(LedgerService::new(Arc::new(InMemoryLivechatRepository::new())));

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let msg = TranscriptMessage::new(SenderType::User, &format!("m{i}"), Utc::now());
                ledger
                    .update("busy", LedgerUpdate::default().with_message(msg))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let rec = ledger.get_required("busy").await.unwrap();
        assert_eq!(rec.messages.len(), 20);
        assert_eq!(rec.version, 20);
        assert!(ledger.locks.is_empty());
    }

    /// Store whose version check always fails, as if another process kept winning.
    struct AlwaysStale(InMemoryLivechatRepository);

    #[async_trait]
    impl LivechatRepository for AlwaysStale {
        async fn get(&self, id: &str) -> Result<Option<VisitorRecord>, Error> {
            self.0.get(id).await
        }
        async fn insert(&self, record: &VisitorRecord) -> Result<bool, Error> {
            self.0.insert(record).await
        }
        async fn replace(&self, _record: &VisitorRecord, _expected: i64) -> Result<bool, Error> {
            Ok(false)
        }
        async fn list(&self, filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error> {
            self.0.list(filter).await
        }
    }

    #[tokio::test]
    async fn test_conflict_after_bounded_retries() {
        let ledger = LedgerService::new(Arc::new(AlwaysStale(InMemoryLivechatRepository::new())));
        ledger.update("v", LedgerUpdate::default()).await.unwrap();

        let err = ledger
            .update("v", LedgerUpdate::default().with_online(true))
            .await
            .unwrap_err();
        match err {
            Error::ConcurrentUpdateConflict { visitor_id, attempts } => {
                assert_eq!(visitor_id, "v");
                assert_eq!(attempts, MAX_UPDATE_ATTEMPTS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Store whose reads never complete.
    struct Stalled;

    #[async_trait]
    impl LivechatRepository for Stalled {
        async fn get(&self, _id: &str) -> Result<Option<VisitorRecord>, Error> {
            std::future::pending().await
        }
        async fn insert(&self, _record: &VisitorRecord) -> Result<bool, Error> {
            Ok(true)
        }
        async fn replace(&self, _record: &VisitorRecord, _expected: i64) -> Result<bool, Error> {
            Ok(true)
        }
        async fn list(&self, _filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_cancelled_update_releases_lock_entry() {
        let ledger = Arc::new(LedgerService::new(Arc::new(Stalled)));

        // one caller holds the lock, a second waits behind it; both time out
        let first = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.update("stuck", LedgerUpdate::default()).await }
        });
        tokio::task::yield_now().await;
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            ledger.update("stuck", LedgerUpdate::default()),
        )
        .await;
        assert!(waited.is_err());
        assert_eq!(ledger.locks.len(), 1);

        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert!(ledger.locks.is_empty());
    }

    #[tokio::test]
    async fn test_missing_visitor_is_not_found() {
        let ledger = LedgerService::new(Arc::new(InMemoryLivechatRepository::new()));
        let err = ledger.get_required("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
