//! Identifier newtypes for users, conversations, and messages.
//!
//! Conversation and message identifiers are 31-bit positive integers so they
//! fit a signed 32-bit column in every backing store. They are minted by
//! folding a random UUID into that range.

use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Largest value a minted identifier may take (`2^31 - 1`, a Mersenne prime).
const ID_BOUND: u128 = (1 << 31) - 1;

/// Folds a random 128-bit UUID into the range `1..ID_BOUND`.
fn mint_positive_i31() -> i32 {
    let folded = Uuid::new_v4().as_u128().rem_euclid(ID_BOUND - 1) + 1;
    i32::try_from(folded).unwrap_or(i32::MAX)
}

/// Opaque identifier of a user, owned by an upstream user directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps an upstream user identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a two-party conversation.
///
/// # Examples
///
/// ```
/// use duologue::messaging::domain::ConversationId;
///
/// let id = ConversationId::mint();
/// assert!(id.value() > 0);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConversationId(i32);

impl ConversationId {
    /// Mints a fresh identifier from a random UUID.
    ///
    /// Uniqueness holds with overwhelming probability over the identifier
    /// space in use; it is not a cryptographic guarantee.
    #[must_use]
    pub fn mint() -> Self {
        Self(mint_positive_i31())
    }

    /// Wraps an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConversationId`] when the value is not
    /// strictly positive.
    pub const fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidConversationId(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message, unique within its conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(i32);

impl MessageId {
    /// Mints a fresh identifier from a random UUID.
    #[must_use]
    pub fn mint() -> Self {
        Self(mint_positive_i31())
    }

    /// Wraps an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMessageId`] when the value is not
    /// strictly positive.
    pub const fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidMessageId(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
