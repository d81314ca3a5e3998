//! Diesel schema for the denormalised messaging tables.
//!
//! Each table's primary key is `(partition key, clustering key...)` so that
//! every query the adapters issue is a partition-equality, clustering-range
//! read served by the primary-key index.

diesel::table! {
    /// Conversation identity index: canonical user pair to conversation.
    conversation_lookup (user_lo, user_hi) {
        /// Numerically lesser participant (partition key).
        user_lo -> Int8,
        /// Numerically greater participant (clustering key).
        user_hi -> Int8,
        /// Conversation registered for the pair.
        conversation_id -> Int4,
    }
}

diesel::table! {
    /// Message log partitioned by conversation.
    messages_by_conversation (conversation_id, created_at, message_id) {
        /// Partition key.
        conversation_id -> Int4,
        /// Primary clustering key.
        created_at -> Timestamptz,
        /// Clustering tiebreaker.
        message_id -> Int4,
        /// Author.
        sender_id -> Int8,
        /// Recipient.
        receiver_id -> Int8,
        /// Message text.
        content -> Text,
    }
}

diesel::table! {
    /// Per-user conversation summaries.
    conversations_by_user (user_id, conversation_id) {
        /// Partition key.
        user_id -> Int8,
        /// Clustering key.
        conversation_id -> Int4,
        /// Counterpart participant.
        other_user_id -> Int8,
        /// Timestamp of the latest message.
        last_message_at -> Timestamptz,
        /// Text of the latest message.
        last_message_content -> Text,
    }
}
