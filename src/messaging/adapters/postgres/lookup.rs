//! `PostgreSQL` conversation identity index.

use super::{
    blocking::{MessagingPgPool, map_diesel_error, run_blocking},
    models::{ConversationLookupRow, to_conversation_id},
    schema::conversation_lookup,
};
use crate::messaging::{
    domain::{ConversationId, ParticipantPair},
    ports::{ConversationLookupRepository, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// Identity index stored in `conversation_lookup`.
#[derive(Debug, Clone)]
pub struct PostgresConversationLookup {
    pool: MessagingPgPool,
}

impl PostgresConversationLookup {
    /// Creates the adapter from an injected connection pool.
    #[must_use]
    pub const fn new(pool: MessagingPgPool) -> Self {
        Self { pool }
    }
}

fn load_stored(
    connection: &mut PgConnection,
    pair: ParticipantPair,
) -> StoreResult<Option<ConversationId>> {
    let stored = conversation_lookup::table
        .filter(conversation_lookup::user_lo.eq(pair.lesser().value()))
        .filter(conversation_lookup::user_hi.eq(pair.greater().value()))
        .select(conversation_lookup::conversation_id)
        .first::<i32>(connection)
        .optional()
        .map_err(map_diesel_error)?;
    stored.map(to_conversation_id).transpose()
}

#[async_trait]
impl ConversationLookupRepository for PostgresConversationLookup {
    async fn find(&self, pair: ParticipantPair) -> StoreResult<Option<ConversationId>> {
        run_blocking(&self.pool, move |connection| load_stored(connection, pair)).await
    }

    async fn insert_if_absent(
        &self,
        pair: ParticipantPair,
        candidate: ConversationId,
    ) -> StoreResult<ConversationId> {
        let row = ConversationLookupRow::new(pair, candidate);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(conversation_lookup::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(map_diesel_error)?;

            // Whichever writer won the conflict, the stored row is the answer.
            load_stored(connection, pair)?
                .ok_or_else(|| StoreError::persistence(diesel::result::Error::NotFound))
        })
        .await
    }
}
