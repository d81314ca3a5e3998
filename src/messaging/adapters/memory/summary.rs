//! In-memory conversation summaries partitioned by user.

use std::cmp::Reverse;

use async_trait::async_trait;

use super::wide_row::WideRowTable;
use crate::messaging::{
    domain::{ConversationId, ConversationSummary, TotalEstimate, UserId},
    ports::{ConversationSummaryRepository, StoreResult, SummaryScan},
};

/// Summary rows keyed by `(user_id, conversation_id)`.
///
/// Rows are clustered by conversation id so that an upsert replaces the
/// previous row in place; recency ordering is applied at read time.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationSummaries {
    table: WideRowTable<UserId, ConversationId, ConversationSummary>,
}

impl InMemoryConversationSummaries {
    /// Creates an empty summary table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationSummaryRepository for InMemoryConversationSummaries {
    async fn upsert(&self, summary: &ConversationSummary) -> StoreResult<()> {
        self.table
            .put(summary.user_id(), summary.conversation_id(), summary.clone())
    }

    async fn scan(&self, query: SummaryScan) -> StoreResult<Vec<ConversationSummary>> {
        let mut rows = self.table.partition_rows(&query.user_id)?;
        rows.sort_by_key(|row| Reverse(row.resume_key()));
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .filter(|row| query.resume.is_none_or(|resume| row.resume_key() < resume))
            .take(limit)
            .collect())
    }

    async fn count(&self, user_id: UserId, cap: u64) -> StoreResult<TotalEstimate> {
        self.table
            .count_below(&user_id, std::ops::Bound::Unbounded, cap)
    }
}
