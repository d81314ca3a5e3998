//! Denormalised direct messaging over a partitioned wide-row store.
//!
//! Three logical tables serve three read patterns, and a service keeps them
//! consistent with fan-out writes:
//!
//! - **Identity index**: unordered user pair to a stable conversation id
//!   ([`services::ConversationIdentityIndex`])
//! - **Message log**: messages partitioned by conversation, read newest
//!   first ([`services::MessageLog`])
//! - **Conversation summaries**: one row per participant per conversation,
//!   listed by recency ([`services::ConversationSummaries`])
//!
//! Every store read is a partition-key equality plus a bounded
//! clustering-key range. Pagination resumes from a clustering key rather
//! than skipping rows, and totals come from a capped count scan.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use duologue::config::MessagingConfig;
//! use duologue::messaging::adapters::memory::{
//!     InMemoryConversationLookup, InMemoryConversationSummaries, InMemoryMessageLog,
//! };
//! use duologue::messaging::domain::{PageRequest, UserId};
//! use duologue::messaging::services::{MessageService, SendMessageRequest};
//! use mockable::DefaultClock;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = MessageService::new(
//!     Arc::new(InMemoryConversationLookup::new()),
//!     Arc::new(InMemoryMessageLog::new()),
//!     Arc::new(InMemoryConversationSummaries::new()),
//!     Arc::new(DefaultClock),
//!     MessagingConfig::default(),
//! );
//!
//! let sent = service
//!     .send_message(SendMessageRequest::new(UserId::new(1), UserId::new(2), "hi"))
//!     .await?;
//! let page = service
//!     .list_messages(sent.conversation_id(), PageRequest::new(1, 20)?)
//!     .await?;
//! assert_eq!(page.data.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
