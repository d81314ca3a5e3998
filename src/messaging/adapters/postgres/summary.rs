//! `PostgreSQL` conversation summaries.

use super::{
    blocking::{MessagingPgPool, map_diesel_error, run_blocking, sql_limit},
    models::{SummaryRow, row_to_summary, summary_to_row},
    schema::conversations_by_user,
};
use crate::messaging::{
    domain::{ConversationSummary, TotalEstimate, UserId},
    ports::{ConversationSummaryRepository, StoreResult, SummaryScan},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// Summaries stored in `conversations_by_user`.
#[derive(Debug, Clone)]
pub struct PostgresConversationSummaries {
    pool: MessagingPgPool,
}

impl PostgresConversationSummaries {
    /// Creates the adapter from an injected connection pool.
    #[must_use]
    pub const fn new(pool: MessagingPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationSummaryRepository for PostgresConversationSummaries {
    async fn upsert(&self, summary: &ConversationSummary) -> StoreResult<()> {
        let row = summary_to_row(summary);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(conversations_by_user::table)
                .values(&row)
                .on_conflict((
                    conversations_by_user::user_id,
                    conversations_by_user::conversation_id,
                ))
                .do_update()
                .set((
                    conversations_by_user::other_user_id.eq(row.other_user_id),
                    conversations_by_user::last_message_at.eq(row.last_message_at),
                    conversations_by_user::last_message_content.eq(&row.last_message_content),
                ))
                .execute(connection)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn scan(&self, query: SummaryScan) -> StoreResult<Vec<ConversationSummary>> {
        run_blocking(&self.pool, move |connection| {
            let mut statement = conversations_by_user::table
                .filter(conversations_by_user::user_id.eq(query.user_id.value()))
                .select(SummaryRow::as_select())
                .into_boxed();

            if let Some(key) = query.resume {
                statement = statement.filter(
                    conversations_by_user::last_message_at.lt(key.at()).or(
                        conversations_by_user::last_message_at
                            .eq(key.at())
                            .and(conversations_by_user::conversation_id.lt(key.id())),
                    ),
                );
            }

            let rows = statement
                .order((
                    conversations_by_user::last_message_at.desc(),
                    conversations_by_user::conversation_id.desc(),
                ))
                .limit(sql_limit(u64::from(query.limit)))
                .load::<SummaryRow>(connection)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_summary).collect()
        })
        .await
    }

    async fn count(&self, user_id: UserId, cap: u64) -> StoreResult<TotalEstimate> {
        run_blocking(&self.pool, move |connection| {
            let seen = conversations_by_user::table
                .filter(conversations_by_user::user_id.eq(user_id.value()))
                .select(conversations_by_user::conversation_id)
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
