//! Per-user conversation listing.

use std::sync::Arc;

use super::{StoreCallPolicy, paging::fetch_page};
use crate::messaging::{
    domain::{Conversation, ConversationSummary, Page, PageRequest, UserId},
    ports::{ConversationSummaryRepository, StoreResult, SummaryScan},
};

/// Maintains and lists each user's conversation summaries.
#[derive(Clone)]
pub struct ConversationSummaries<S>
where
    S: ConversationSummaryRepository,
{
    summaries: Arc<S>,
    policy: StoreCallPolicy,
    count_cap: u64,
}

impl<S> ConversationSummaries<S>
where
    S: ConversationSummaryRepository,
{
    /// Creates the service.
    #[must_use]
    pub const fn new(summaries: Arc<S>, policy: StoreCallPolicy, count_cap: u64) -> Self {
        Self {
            summaries,
            policy,
            count_cap,
        }
    }

    /// Overwrites the summary row for `(user_id, conversation_id)`.
    ///
    /// Last write wins; repeating the same touch leaves the row unchanged,
    /// so the call is retried on transient failure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when the upsert fails
    /// after retries.
    pub async fn touch(&self, summary: &ConversationSummary) -> StoreResult<()> {
        self.policy
            .idempotent("conversation_summary.upsert", || self.summaries.upsert(summary))
            .await
    }

    /// Returns one page of the user's conversations, most recently active
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when a scan or the
    /// count fails after retries.
    pub async fn list(&self, user_id: UserId, request: PageRequest) -> StoreResult<Page<Conversation>> {
        let summaries = &*self.summaries;
        let policy = &self.policy;
        let rows = fetch_page(request, ConversationSummary::resume_key, move |resume, limit| {
            let query = SummaryScan {
                user_id,
                resume,
                limit,
            };
            policy.idempotent("conversation_summary.scan", move || summaries.scan(query))
        });
        let total = policy.idempotent("conversation_summary.count", || {
            summaries.count(user_id, self.count_cap)
        });
        let (slice, estimate) = tokio::try_join!(rows, total)?;

        Ok(Page {
            total: estimate.count,
            page: request.page(),
            limit: request.limit(),
            data: slice.rows.into_iter().map(Conversation::from).collect(),
            total_exact: estimate.exact,
            next_token: slice.next_token,
        })
    }
}
