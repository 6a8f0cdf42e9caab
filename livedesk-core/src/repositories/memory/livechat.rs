// src/repositories/memory/livechat.rs

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use livedesk_common::models::{VisitorFilter, VisitorRecord};
use livedesk_common::traits::LivechatRepository;

use crate::Error;

/// `DashMap`-backed ledger storage for tests and `--store memory`.
/// Each record remembers its insertion sequence so listing order is stable.
#[derive(Default)]
pub struct InMemoryLivechatRepository {
    records: DashMap<String, (u64, VisitorRecord)>,
    next_seq: AtomicU64,
}

impl InMemoryLivechatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LivechatRepository for InMemoryLivechatRepository {
    async fn get(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, Error> {
        Ok(self.records.get(visitor_id).map(|r| r.value().1.clone()))
    }

    async fn insert(&self, record: &VisitorRecord) -> Result<bool, Error> {
        match self.records.entry(record.visitor_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                slot.insert((seq, record.clone()));
                Ok(true)
            }
        }
    }

    async fn replace(&self, record: &VisitorRecord, expected_version: i64) -> Result<bool, Error> {
        match self.records.get_mut(&record.visitor_id) {
            Some(mut stored) if stored.1.version == expected_version => {
                stored.1 = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error> {
        let mut out: Vec<(u64, VisitorRecord)> = self
            .records
            .iter()
            .filter(|r| filter.matches(&r.value().1))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(out.into_iter().map(|(_, r)| r).collect())
    }
}
