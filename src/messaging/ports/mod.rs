//! Port contracts for the three denormalised tables.
//!
//! Each port models one logical table of a partitioned wide-row store: reads
//! are partition-key equality plus a bounded clustering-key range, and no
//! operation spans partitions.

mod error;
pub mod lookup;
pub mod message_log;
pub mod summary;

pub use error::{StoreError, StoreResult};
pub use lookup::ConversationLookupRepository;
pub use message_log::{LogScan, MessageLogRepository};
pub use summary::{ConversationSummaryRepository, SummaryScan};
