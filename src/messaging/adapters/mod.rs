//! Persistence adapters for the messaging ports.
//!
//! # Available Adapters
//!
//! - [`memory`]: in-process wide-row engine for tests and embedding
//! - [`postgres`]: Diesel-backed tables keyed by partition and clustering
//!   columns

pub mod memory;
pub mod postgres;
