//! Repository port for the per-conversation message log.
//!
//! Partition key: `conversation_id`. Clustering key: `(created_at,
//! message_id)`, read in descending order.

use super::StoreResult;
use crate::messaging::domain::{ConversationId, Message, ResumeKey, TotalEstimate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A bounded, descending range read over one conversation partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogScan {
    /// Partition to read.
    pub conversation_id: ConversationId,
    /// Only rows with `created_at` strictly before this instant.
    pub before: Option<DateTime<Utc>>,
    /// Only rows strictly below this clustering key.
    pub resume: Option<ResumeKey>,
    /// Maximum number of rows to return.
    pub limit: u32,
}

impl LogScan {
    /// Reads the newest `limit` rows of a conversation.
    #[must_use]
    pub const fn newest(conversation_id: ConversationId, limit: u32) -> Self {
        Self {
            conversation_id,
            before: None,
            resume: None,
            limit,
        }
    }
}

/// Persistence contract for message rows.
///
/// Rows are append-only: there are no update or delete operations.
#[async_trait]
pub trait MessageLogRepository: Send + Sync {
    /// Writes one message row unconditionally.
    async fn append(&self, message: &Message) -> StoreResult<()>;

    /// Returns up to `query.limit` rows ordered by `(created_at, id)`
    /// descending.
    async fn scan(&self, query: LogScan) -> StoreResult<Vec<Message>>;

    /// Counts rows in a conversation (optionally before an instant), reading
    /// at most `cap + 1` rows.
    async fn count(
        &self,
        conversation_id: ConversationId,
        before: Option<DateTime<Utc>>,
        cap: u64,
    ) -> StoreResult<TotalEstimate>;
}
