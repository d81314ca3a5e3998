//! Duologue: data-access core for one-to-one messaging.
//!
//! This crate persists direct messages and conversations on a store that
//! only supports partition-key equality and clustering-key range scans,
//! with no cross-partition transactions and no OFFSET pagination.
//!
//! # Architecture
//!
//! Duologue follows hexagonal architecture principles:
//!
//! - **Domain**: Pure value types with no infrastructure dependencies
//! - **Ports**: One repository trait per logical table
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration, pagination and store-call policy
//!
//! # Modules
//!
//! - [`messaging`]: Conversations, messages and per-user summaries
//! - [`config`]: Service tunables loaded from TOML

pub mod config;
pub mod messaging;
