//! Repository port for per-user conversation summaries.
//!
//! Partition key: `user_id`. Rows are keyed by `conversation_id` and listed
//! by recency, `(last_message_at, conversation_id)` descending.

use super::StoreResult;
use crate::messaging::domain::{ConversationSummary, ResumeKey, TotalEstimate, UserId};
use async_trait::async_trait;

/// A bounded, recency-ordered read over one user's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryScan {
    /// Partition to read.
    pub user_id: UserId,
    /// Only rows strictly below this recency key.
    pub resume: Option<ResumeKey>,
    /// Maximum number of rows to return.
    pub limit: u32,
}

/// Persistence contract for conversation summary rows.
#[async_trait]
pub trait ConversationSummaryRepository: Send + Sync {
    /// Inserts or fully overwrites the row for
    /// `(summary.user_id, summary.conversation_id)`.
    async fn upsert(&self, summary: &ConversationSummary) -> StoreResult<()>;

    /// Returns up to `query.limit` rows, most recently active first.
    async fn scan(&self, query: SummaryScan) -> StoreResult<Vec<ConversationSummary>>;

    /// Counts the conversations in a user's partition, reading at most
    /// `cap + 1` rows.
    async fn count(&self, user_id: UserId, cap: u64) -> StoreResult<TotalEstimate>;
}
