//! In-memory adapters backed by a small wide-row engine.
//!
//! These adapters reproduce the access rules of a partitioned store
//! (partition equality plus clustering ranges) without any external
//! dependency, and are used by unit and integration tests.

mod lookup;
mod message_log;
mod summary;
mod wide_row;

pub use lookup::InMemoryConversationLookup;
pub use message_log::InMemoryMessageLog;
pub use summary::InMemoryConversationSummaries;
