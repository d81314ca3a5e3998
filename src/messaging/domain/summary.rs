//! Per-user conversation summaries and the conversation display view.

use super::{ConversationId, Message, ResumeKey, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant's denormalised view of a conversation.
///
/// Each conversation has two summaries, one in each participant's partition.
/// A summary is overwritten wholesale whenever a new message lands in the
/// conversation; there is no merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    user_id: UserId,
    conversation_id: ConversationId,
    other_user_id: UserId,
    last_message_at: DateTime<Utc>,
    last_message_content: String,
}

impl ConversationSummary {
    /// Creates a summary row for `user_id`'s partition.
    #[must_use]
    pub fn new(
        user_id: UserId,
        conversation_id: ConversationId,
        other_user_id: UserId,
        last_message_at: DateTime<Utc>,
        last_message_content: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            conversation_id,
            other_user_id,
            last_message_at,
            last_message_content: last_message_content.into(),
        }
    }

    /// Builds the sender's summary for a freshly appended message.
    #[must_use]
    pub fn for_sender(message: &Message) -> Self {
        Self::new(
            message.sender_id(),
            message.conversation_id(),
            message.receiver_id(),
            message.created_at(),
            message.content(),
        )
    }

    /// Builds the receiver's summary for a freshly appended message.
    #[must_use]
    pub fn for_receiver(message: &Message) -> Self {
        Self::new(
            message.receiver_id(),
            message.conversation_id(),
            message.sender_id(),
            message.created_at(),
            message.content(),
        )
    }

    /// Returns the partition owner.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the counterpart participant.
    #[must_use]
    pub const fn other_user_id(&self) -> UserId {
        self.other_user_id
    }

    /// Returns the timestamp of the latest message.
    #[must_use]
    pub const fn last_message_at(&self) -> DateTime<Utc> {
        self.last_message_at
    }

    /// Returns the text of the latest message.
    #[must_use]
    pub fn last_message_content(&self) -> &str {
        &self.last_message_content
    }

    /// Returns the recency key used to order and resume listings.
    #[must_use]
    pub const fn resume_key(&self) -> ResumeKey {
        ResumeKey::new(self.last_message_at, self.conversation_id.value())
    }
}

/// Display metadata for a conversation.
///
/// Conversations have no table of their own; this view is derived either
/// from a participant's summary row or from the newest message in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: ConversationId,
    /// First participant (the listing user, or the latest sender).
    pub user1_id: UserId,
    /// Second participant.
    pub user2_id: UserId,
    /// Timestamp of the latest message.
    pub last_message_at: DateTime<Utc>,
    /// Text of the latest message.
    pub last_message_content: String,
}

impl Conversation {
    /// Derives the view from the most recent message in a conversation.
    #[must_use]
    pub fn from_latest_message(message: &Message) -> Self {
        Self {
            id: message.conversation_id(),
            user1_id: message.sender_id(),
            user2_id: message.receiver_id(),
            last_message_at: message.created_at(),
            last_message_content: message.content().to_owned(),
        }
    }
}

impl From<ConversationSummary> for Conversation {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            id: summary.conversation_id,
            user1_id: summary.user_id,
            user2_id: summary.other_user_id,
            last_message_at: summary.last_message_at,
            last_message_content: summary.last_message_content,
        }
    }
}
