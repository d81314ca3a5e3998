//! Error types for domain value construction.

use thiserror::Error;

/// Errors returned while constructing domain identifiers from raw values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Conversation identifiers are strictly positive.
    #[error("invalid conversation id {0}, expected a positive integer")]
    InvalidConversationId(i32),

    /// Message identifiers are strictly positive.
    #[error("invalid message id {0}, expected a positive integer")]
    InvalidMessageId(i32),
}

/// Errors returned when message content is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The content is empty or whitespace only.
    #[error("message content must not be blank")]
    Blank,

    /// The content exceeds the configured size limit.
    #[error("message content is {actual} bytes, exceeds limit of {limit} bytes")]
    TooLarge {
        /// Size of the rejected content in bytes.
        actual: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },
}

/// Errors returned for malformed pagination input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaginationError {
    /// Page numbers start at 1.
    #[error("invalid page {0}, expected a positive integer")]
    InvalidPage(i64),

    /// A page must hold at least one item.
    #[error("invalid limit {0}, expected a positive integer")]
    InvalidLimit(i64),

    /// The limit is larger than the configured maximum.
    #[error("limit {requested} exceeds maximum of {max}")]
    LimitTooLarge {
        /// Requested page size.
        requested: u32,
        /// Configured maximum page size.
        max: u32,
    },

    /// The continuation token could not be decoded.
    #[error("malformed continuation token '{0}'")]
    MalformedToken(String),
}
