//! In-memory message log partitioned by conversation.

use std::ops::Bound;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::wide_row::WideRowTable;
use crate::messaging::{
    domain::{ConversationId, Message, ResumeKey, TotalEstimate},
    ports::{LogScan, MessageLogRepository, StoreResult},
};

/// Clustering key: `(created_at, message_id)`.
type LogKey = (DateTime<Utc>, i32);

/// Message log keyed by `(conversation_id, created_at, message_id)`.
///
/// Clones share storage. Suitable for tests and single-process use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageLog {
    table: WideRowTable<ConversationId, LogKey, Message>,
}

impl InMemoryMessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Upper clustering bound for a scan: strictly below both the `before`
/// instant and the resume key, whichever is tighter.
fn upper_bound(before: Option<DateTime<Utc>>, resume: Option<ResumeKey>) -> Bound<LogKey> {
    let from_before = before.map(|at| (at, i32::MIN));
    let from_resume = resume.map(|key| (key.at(), key.id()));
    match (from_before, from_resume) {
        (Some(a), Some(b)) => Bound::Excluded(a.min(b)),
        (Some(key), None) | (None, Some(key)) => Bound::Excluded(key),
        (None, None) => Bound::Unbounded,
    }
}

#[async_trait]
impl MessageLogRepository for InMemoryMessageLog {
    async fn append(&self, message: &Message) -> StoreResult<()> {
        let key = (message.created_at(), message.id().value());
        self.table
            .put(message.conversation_id(), key, message.clone())
    }

    async fn scan(&self, query: LogScan) -> StoreResult<Vec<Message>> {
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        self.table.scan_below(
            &query.conversation_id,
            upper_bound(query.before, query.resume),
            limit,
        )
    }

    async fn count(
        &self,
        conversation_id: ConversationId,
        before: Option<DateTime<Utc>>,
        cap: u64,
    ) -> StoreResult<TotalEstimate> {
        self.table
            .count_below(&conversation_id, upper_bound(before, None), cap)
    }
}
