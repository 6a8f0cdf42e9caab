use async_trait::async_trait;

use crate::error::Error;
use crate::models::{MessageContext, VisitorFilter, VisitorRecord};

/// Storage for visitor session records.
///
/// Writes are version-checked: `insert` only succeeds when no record exists,
/// `replace` only when the stored version still equals `expected_version`.
/// Both return `false` when they lost the race instead of erroring.
#[async_trait]
pub trait LivechatRepository: Send + Sync {
    async fn get(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, Error>;

    async fn insert(&self, record: &VisitorRecord) -> Result<bool, Error>;

    async fn replace(&self, record: &VisitorRecord, expected_version: i64) -> Result<bool, Error>;

    /// Matching records, most recently created first.
    async fn list(&self, filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error>;
}

/// Message-anchored UI state, keyed by outbound message id.
#[async_trait]
pub trait MessageContextRepository: Send + Sync {
    async fn put(&self, message_id: &str, context: &MessageContext) -> Result<(), Error>;

    async fn get(&self, message_id: &str) -> Result<Option<MessageContext>, Error>;
}
