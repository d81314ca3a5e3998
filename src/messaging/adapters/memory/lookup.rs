//! In-memory conversation identity index.

use async_trait::async_trait;

use super::wide_row::WideRowTable;
use crate::messaging::{
    domain::{ConversationId, ParticipantPair, UserId},
    ports::{ConversationLookupRepository, StoreResult},
};

/// Identity index partitioned by the lesser participant.
///
/// Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationLookup {
    table: WideRowTable<UserId, UserId, ConversationId>,
}

impl InMemoryConversationLookup {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationLookupRepository for InMemoryConversationLookup {
    async fn find(&self, pair: ParticipantPair) -> StoreResult<Option<ConversationId>> {
        self.table.get(&pair.lesser(), &pair.greater())
    }

    async fn insert_if_absent(
        &self,
        pair: ParticipantPair,
        candidate: ConversationId,
    ) -> StoreResult<ConversationId> {
        self.table
            .put_if_absent(pair.lesser(), pair.greater(), candidate)
    }
}
