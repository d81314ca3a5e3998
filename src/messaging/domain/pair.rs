//! Canonical, order-independent pairing of two conversation participants.

use super::UserId;
use std::fmt;

/// An unordered pair of users, stored with the numerically lesser id first.
///
/// `ParticipantPair::new(a, b)` and `ParticipantPair::new(b, a)` are equal,
/// which is what lets the identity index resolve either direction to the
/// same conversation.
///
/// # Examples
///
/// ```
/// use duologue::messaging::domain::{ParticipantPair, UserId};
///
/// let pair = ParticipantPair::new(UserId::new(9), UserId::new(4));
/// assert_eq!(pair.lesser(), UserId::new(4));
/// assert_eq!(pair, ParticipantPair::new(UserId::new(4), UserId::new(9)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    lesser: UserId,
    greater: UserId,
}

impl ParticipantPair {
    /// Canonicalises two participants by numeric order.
    #[must_use]
    pub fn new(user_a: UserId, user_b: UserId) -> Self {
        Self {
            lesser: user_a.min(user_b),
            greater: user_a.max(user_b),
        }
    }

    /// Returns the participant with the smaller identifier.
    #[must_use]
    pub const fn lesser(self) -> UserId {
        self.lesser
    }

    /// Returns the participant with the larger identifier.
    #[must_use]
    pub const fn greater(self) -> UserId {
        self.greater
    }
}

impl fmt::Display for ParticipantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lesser, self.greater)
    }
}
