//! Domain model for direct messaging.
//!
//! Pure value types with no infrastructure dependencies: identifiers, the
//! canonical participant pair, messages, per-user summaries, and the
//! pagination vocabulary shared by every listing.

mod content;
mod error;
mod ids;
mod message;
mod page;
mod pair;
mod summary;

pub use content::MessageContent;
pub use error::{ContentError, DomainError, PaginationError};
pub use ids::{ConversationId, MessageId, UserId};
pub use message::{Message, PersistedMessage, stored_precision};
pub use page::{ContinuationToken, Page, PageRequest, ResumeKey, TotalEstimate};
pub use pair::ParticipantPair;
pub use summary::{Conversation, ConversationSummary};
