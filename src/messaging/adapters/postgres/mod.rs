//! `PostgreSQL` adapters for the messaging tables using Diesel ORM.
//!
//! The relational store is used as a wide-row store: every table is keyed
//! by `(partition key, clustering key)` and every query is a partition
//! equality plus a bounded clustering range. The schema lives in
//! `migrations/`.
//!
//! # Example
//!
//! ```ignore
//! use diesel::r2d2::{ConnectionManager, Pool};
//! use diesel::PgConnection;
//! use duologue::messaging::adapters::postgres::PostgresMessageLog;
//!
//! let manager = ConnectionManager::<PgConnection>::new("postgres://...");
//! let pool = Pool::builder().build(manager).expect("pool");
//! let log = PostgresMessageLog::new(pool);
//! ```

mod blocking;
mod lookup;
mod message_log;
pub mod models;
mod schema;
mod summary;

pub use blocking::MessagingPgPool;
pub use lookup::PostgresConversationLookup;
pub use message_log::PostgresMessageLog;
pub use summary::PostgresConversationSummaries;
