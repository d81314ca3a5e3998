//! Conversation identity resolution.

use std::sync::Arc;

use tracing::{debug, info};

use super::StoreCallPolicy;
use crate::messaging::{
    domain::{ConversationId, ParticipantPair, UserId},
    ports::{ConversationLookupRepository, StoreResult},
};

/// Maps an unordered pair of users to its stable conversation identifier.
#[derive(Clone)]
pub struct ConversationIdentityIndex<I>
where
    I: ConversationLookupRepository,
{
    lookup: Arc<I>,
    policy: StoreCallPolicy,
}

impl<I> ConversationIdentityIndex<I>
where
    I: ConversationLookupRepository,
{
    /// Creates the index over a lookup repository.
    #[must_use]
    pub const fn new(lookup: Arc<I>, policy: StoreCallPolicy) -> Self {
        Self { lookup, policy }
    }

    /// Returns the conversation for the pair without creating one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when the lookup fails
    /// after retries.
    pub async fn find(&self, user_a: UserId, user_b: UserId) -> StoreResult<Option<ConversationId>> {
        let pair = ParticipantPair::new(user_a, user_b);
        self.policy
            .idempotent("conversation_lookup.find", || self.lookup.find(pair))
            .await
    }

    /// Returns the conversation for the pair, registering a new one when
    /// none exists.
    ///
    /// The result is symmetric in its arguments. Concurrent callers for the
    /// same pair all observe the identifier that won the conditional insert.
    ///
    /// # Errors
    ///
    /// Returns [`crate::messaging::ports::StoreError`] when the lookup fails
    /// after retries or the insert fails. The insert is never retried.
    pub async fn resolve_or_create(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> StoreResult<ConversationId> {
        let pair = ParticipantPair::new(user_a, user_b);
        let existing = self
            .policy
            .idempotent("conversation_lookup.find", || self.lookup.find(pair))
            .await?;
        if let Some(conversation_id) = existing {
            debug!(%pair, %conversation_id, "conversation resolved from index");
            return Ok(conversation_id);
        }

        let candidate = ConversationId::mint();
        let stored = self
            .policy
            .once(
                "conversation_lookup.insert_if_absent",
                self.lookup.insert_if_absent(pair, candidate),
            )
            .await?;
        if stored == candidate {
            info!(%pair, conversation_id = %stored, "conversation created");
        } else {
            debug!(%pair, conversation_id = %stored, "concurrent creation won; reusing stored id");
        }
        Ok(stored)
    }
}
