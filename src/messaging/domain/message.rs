//! A single direct message, the row type of the message log.

use super::{ConversationId, MessageContent, MessageId, ResumeKey, UserId};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Number of fractional-second digits kept on stored timestamps.
const TIMESTAMP_PRECISION: u16 = 6;

/// Truncates a timestamp to the stored precision.
#[must_use]
pub fn stored_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(TIMESTAMP_PRECISION)
}

/// A message sent from one user to another within a conversation.
///
/// # Invariants
///
/// - `created_at` is captured from the service clock at append time, never
///   supplied by the client, and is the log's primary sort key
/// - `id` breaks ties between messages sharing a timestamp, which only
///   happens across service instances
/// - messages are never modified after creation
///
/// # Examples
///
/// ```
/// use duologue::messaging::domain::{ConversationId, Message, MessageContent, UserId};
/// use mockable::DefaultClock;
///
/// let content = MessageContent::parse("hello", 1024).expect("valid content");
/// let message = Message::new(
///     ConversationId::mint(),
///     UserId::new(1),
///     UserId::new(2),
///     content,
///     &DefaultClock,
/// );
/// assert_eq!(message.content(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier unique within the conversation.
    id: MessageId,

    /// The partition this message belongs to.
    conversation_id: ConversationId,

    /// Author of the message.
    sender_id: UserId,

    /// Recipient of the message.
    receiver_id: UserId,

    /// Message text.
    content: MessageContent,

    /// Creation timestamp at microsecond precision.
    created_at: DateTime<Utc>,
}

/// Stored field values used to rebuild a [`Message`] read from a backend.
#[derive(Debug, Clone)]
pub struct PersistedMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Conversation partition key.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender_id: UserId,
    /// Recipient.
    pub receiver_id: UserId,
    /// Message text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the clock's current time and a freshly
    /// minted identifier.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
        clock: &impl Clock,
    ) -> Self {
        Self::stamped(conversation_id, sender_id, receiver_id, content, clock.utc())
    }

    /// Creates a message with an explicit creation time, truncated to stored
    /// precision.
    #[must_use]
    pub fn stamped(
        conversation_id: ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::mint(),
            conversation_id,
            sender_id,
            receiver_id,
            content,
            created_at: stored_precision(created_at),
        }
    }

    /// Reconstructs a message from stored values.
    #[must_use]
    pub fn from_persisted(data: PersistedMessage) -> Self {
        Self {
            id: data.id,
            conversation_id: data.conversation_id,
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            content: MessageContent::from_persisted(data.content),
            created_at: data.created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Returns the receiver.
    #[must_use]
    pub const fn receiver_id(&self) -> UserId {
        self.receiver_id
    }

    /// Returns the message text.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the clustering key of this row within its conversation.
    #[must_use]
    pub const fn resume_key(&self) -> ResumeKey {
        ResumeKey::new(self.created_at, self.id.value())
    }
}
