//! Message log service: append plus paginated reverse-chronological reads.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use chrono::{DateTime, Utc};
use mockable::Clock;

use super::{StoreCallPolicy, paging::fetch_page};
use crate::messaging::{
    domain::{
        ConversationId, Message, MessageContent, Page, PageRequest, UserId, stored_precision,
    },
    ports::{LogScan, MessageLogRepository, StoreResult},
};

/// Hands out strictly increasing creation timestamps at stored precision.
#[derive(Debug)]
struct CreationStamps {
    last_micros: AtomicI64,
}

impl CreationStamps {
    const fn new() -> Self {
        Self {
            last_micros: AtomicI64::new(i64::MIN),
        }
    }

    /// Returns `now`, or one microsecond past the previous stamp when the
    /// clock has not moved beyond it.
    fn next(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now_micros = stored_precision(now).timestamp_micros();
        let issue = |last: i64| now_micros.max(last.saturating_add(1));
        let previous = match self.last_micros.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |last| Some(issue(last)),
        ) {
            Ok(last) | Err(last) => last,
        };
        DateTime::<Utc>::from_timestamp_micros(issue(previous)).unwrap_or(now)
    }
}

/// Reads and writes one conversation partition of the message log.
#[derive(Clone)]
pub struct MessageLog<L, C>
where
    L: MessageLogRepository,
    C: Clock + Send + Sync,
{
    log: Arc<L>,
    clock: Arc<C>,
    stamps: Arc<CreationStamps>,
    policy: StoreCallPolicy,
    count_cap: u64,
}

impl<L, C> MessageLog<L, C>
where
    L: MessageLogRepository,
    C: Clock + Send + Sync,
{
    /// Creates the service.
    ///
    /// `count_cap` bounds how many rows a total-count scan may read.
    #[must_use]
    pub fn new(log: Arc<L>, clock: Arc<C>, policy: StoreCallPolicy, count_cap: u64) -> Self {
        Self {
            log,
            clock,
            stamps: Arc::new(CreationStamps::new()),
            policy,
            count_cap,
        }
    }

    /// Stamps and stores a new message, returning it.
    ///
    /// The identifier and timestamp are assigned here. Timestamps issued by
    /// one `MessageLog` (and its clones) strictly increase, so messages
    /// appended in sequence cluster in that sequence even when the clock
    /// reads the same instant twice. The write is a single unconditional
    /// insert and is not retried, so a timeout leaves the outcome unknown.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when the write fails
    /// or times out.
    pub async fn append(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
    ) -> StoreResult<Message> {
        let created_at = self.stamps.next(self.clock.utc());
        let message = Message::stamped(conversation_id, sender_id, receiver_id, content, created_at);
        self.policy
            .once("message_log.append", self.log.append(&message))
            .await?;
        Ok(message)
    }

    /// Returns one page of the conversation, newest first.
    ///
    /// With `before`, only messages created strictly before that instant
    /// are listed, and the total counts only those.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when a scan or the
    /// count fails after retries.
    pub async fn scan(
        &self,
        conversation_id: ConversationId,
        before: Option<DateTime<Utc>>,
        request: PageRequest,
    ) -> StoreResult<Page<Message>> {
        let log = &*self.log;
        let policy = &self.policy;
        let rows = fetch_page(request, Message::resume_key, move |resume, limit| {
            let query = LogScan {
                conversation_id,
                before,
                resume,
                limit,
            };
            policy.idempotent("message_log.scan", move || log.scan(query))
        });
        let total = policy.idempotent("message_log.count", || {
            log.count(conversation_id, before, self.count_cap)
        });
        let (slice, estimate) = tokio::try_join!(rows, total)?;

        Ok(Page {
            total: estimate.count,
            page: request.page(),
            limit: request.limit(),
            data: slice.rows,
            total_exact: estimate.exact,
            next_token: slice.next_token,
        })
    }

    /// Returns the newest message of the conversation, if any.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when the head read
    /// fails after retries.
    pub async fn latest(&self, conversation_id: ConversationId) -> StoreResult<Option<Message>> {
        let query = LogScan::newest(conversation_id, 1);
        let rows = self
            .policy
            .idempotent("message_log.scan", || self.log.scan(query))
            .await?;
        Ok(rows.into_iter().next())
    }
}
