//! `PostgreSQL` message log.

use super::{
    blocking::{MessagingPgPool, map_diesel_error, run_blocking, sql_limit},
    models::{MessageRow, message_to_row, row_to_message},
    schema::messages_by_conversation,
};
use crate::messaging::{
    domain::{ConversationId, Message, TotalEstimate},
    ports::{LogScan, MessageLogRepository, StoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Message log stored in `messages_by_conversation`.
#[derive(Debug, Clone)]
pub struct PostgresMessageLog {
    pool: MessagingPgPool,
}

impl PostgresMessageLog {
    /// Creates the adapter from an injected connection pool.
    #[must_use]
    pub const fn new(pool: MessagingPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLogRepository for PostgresMessageLog {
    async fn append(&self, message: &Message) -> StoreResult<()> {
        let row = message_to_row(message);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(messages_by_conversation::table)
                .values(&row)
                .execute(connection)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn scan(&self, query: LogScan) -> StoreResult<Vec<Message>> {
        run_blocking(&self.pool, move |connection| {
            let mut statement = messages_by_conversation::table
                .filter(messages_by_conversation::conversation_id.eq(query.conversation_id.value()))
                .select(MessageRow::as_select())
                .into_boxed();

            if let Some(before) = query.before {
                statement = statement.filter(messages_by_conversation::created_at.lt(before));
            }
            if let Some(key) = query.resume {
                statement = statement.filter(
                    messages_by_conversation::created_at.lt(key.at()).or(
                        messages_by_conversation::created_at
                            .eq(key.at())
                            .and(messages_by_conversation::message_id.lt(key.id())),
                    ),
                );
            }

            let rows = statement
                .order((
                    messages_by_conversation::created_at.desc(),
                    messages_by_conversation::message_id.desc(),
                ))
                .limit(sql_limit(u64::from(query.limit)))
                .load::<MessageRow>(connection)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_message).collect()
        })
        .await
    }

    async fn count(
        &self,
        conversation_id: ConversationId,
        before: Option<DateTime<Utc>>,
        cap: u64,
    ) -> StoreResult<TotalEstimate> {
        run_blocking(&self.pool, move |connection| {
            let mut statement = messages_by_conversation::table
                .filter(messages_by_conversation::conversation_id.eq(conversation_id.value()))
                .select(messages_by_conversation::message_id)
                .into_boxed();

            if let Some(at) = before {
                statement = statement.filter(messages_by_conversation::created_at.lt(at));
            }

            let seen = statement
                .limit(sql_limit(cap.saturating_add(1)))
                .load::<i32>(connection)
                .map_err(map_diesel_error)?
                .len();
            Ok(TotalEstimate::from_bounded_scan(
                u64::try_from(seen).unwrap_or(u64::MAX),
                cap,
            ))
        })
        .await
    }
}
