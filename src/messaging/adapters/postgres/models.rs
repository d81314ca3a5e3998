//! Diesel row models and row/domain conversions.

use super::schema::{conversation_lookup, conversations_by_user, messages_by_conversation};
use crate::messaging::{
    domain::{
        ConversationId, ConversationSummary, Message, MessageId, ParticipantPair,
        PersistedMessage, UserId,
    },
    ports::{StoreError, StoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insert model for identity index entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversation_lookup)]
pub struct ConversationLookupRow {
    /// Numerically lesser participant.
    pub user_lo: i64,
    /// Numerically greater participant.
    pub user_hi: i64,
    /// Registered conversation.
    pub conversation_id: i32,
}

impl ConversationLookupRow {
    /// Builds the row registering `conversation_id` for `pair`.
    #[must_use]
    pub const fn new(pair: ParticipantPair, conversation_id: ConversationId) -> Self {
        Self {
            user_lo: pair.lesser().value(),
            user_hi: pair.greater().value(),
            conversation_id: conversation_id.value(),
        }
    }
}

/// Message log row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages_by_conversation)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Partition key.
    pub conversation_id: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Message identifier.
    pub message_id: i32,
    /// Author.
    pub sender_id: i64,
    /// Recipient.
    pub receiver_id: i64,
    /// Message text.
    pub content: String,
}

/// Conversation summary row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations_by_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SummaryRow {
    /// Partition owner.
    pub user_id: i64,
    /// Conversation identifier.
    pub conversation_id: i32,
    /// Counterpart participant.
    pub other_user_id: i64,
    /// Timestamp of the latest message.
    pub last_message_at: DateTime<Utc>,
    /// Text of the latest message.
    pub last_message_content: String,
}

/// Converts a stored conversation id, rejecting non-positive values.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPersistedData`] for ids that are not
/// strictly positive.
pub fn to_conversation_id(raw: i32) -> StoreResult<ConversationId> {
    ConversationId::new(raw).map_err(StoreError::invalid_persisted_data)
}

/// Converts a domain message into its row.
#[must_use]
pub fn message_to_row(message: &Message) -> MessageRow {
    MessageRow {
        conversation_id: message.conversation_id().value(),
        created_at: message.created_at(),
        message_id: message.id().value(),
        sender_id: message.sender_id().value(),
        receiver_id: message.receiver_id().value(),
        content: message.content().to_owned(),
    }
}

/// Converts a message row into the domain type.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPersistedData`] when an identifier column
/// holds a value the domain rejects.
pub fn row_to_message(row: MessageRow) -> StoreResult<Message> {
    let MessageRow {
        conversation_id,
        created_at,
        message_id,
        sender_id,
        receiver_id,
        content,
    } = row;

    Ok(Message::from_persisted(PersistedMessage {
        id: MessageId::new(message_id).map_err(StoreError::invalid_persisted_data)?,
        conversation_id: to_conversation_id(conversation_id)?,
        sender_id: UserId::new(sender_id),
        receiver_id: UserId::new(receiver_id),
        content,
        created_at,
    }))
}

/// Converts a domain summary into its row.
#[must_use]
pub fn summary_to_row(summary: &ConversationSummary) -> SummaryRow {
    SummaryRow {
        user_id: summary.user_id().value(),
        conversation_id: summary.conversation_id().value(),
        other_user_id: summary.other_user_id().value(),
        last_message_at: summary.last_message_at(),
        last_message_content: summary.last_message_content().to_owned(),
    }
}

/// Converts a summary row into the domain type.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPersistedData`] when the conversation id is
/// not strictly positive.
pub fn row_to_summary(row: SummaryRow) -> StoreResult<ConversationSummary> {
    Ok(ConversationSummary::new(
        UserId::new(row.user_id),
        to_conversation_id(row.conversation_id)?,
        UserId::new(row.other_user_id),
        row.last_message_at,
        row.last_message_content,
    ))
}
