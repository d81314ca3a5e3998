//! Repository port for the conversation identity index.
//!
//! Partition key: the lesser participant id. Clustering key: the greater
//! participant id. Lookups are exact-key reads; no range scans.

use super::StoreResult;
use crate::messaging::domain::{ConversationId, ParticipantPair};
use async_trait::async_trait;

/// Persistence contract for the pair → conversation index.
#[async_trait]
pub trait ConversationLookupRepository: Send + Sync {
    /// Returns the conversation registered for `pair`, if any.
    async fn find(&self, pair: ParticipantPair) -> StoreResult<Option<ConversationId>>;

    /// Registers `candidate` for `pair` unless an entry already exists.
    ///
    /// Returns the identifier that is stored after the call: `candidate`
    /// when this call created the entry, otherwise the identifier written by
    /// an earlier (or concurrent) caller. Implementations must make the
    /// check and the write a single conditional operation.
    async fn insert_if_absent(
        &self,
        pair: ParticipantPair,
        candidate: ConversationId,
    ) -> StoreResult<ConversationId>;
}
