//! Data layer for Hearth.
//!
//! This crate is the storage boundary of the system: an append-only event
//! log with an expected-version check, and storage for the one materialized
//! read model (household activity). Each has an in-memory backend for
//! development and tests and a `PostgreSQL` backend for production.
//!
//! # Architecture
//!
//! ```text
//! Commands ---- append(stream, fact, expected) ----+
//!                                                  v
//! Queries  ---- load/fetch(stream) -----------> EventLog --> MemoryEventStore
//!                                                        \-> PostgresEventStore (stream_events)
//!
//! Activity rebuild -- replace(household, entries) --> ActivityStore --> MemoryActivityStore
//!                                                                   \-> PostgresActivityStore (activities)
//! ```
//!
//! # Modules
//!
//! - [`event_log`] -- The log contract (enum dispatch over backends)
//! - [`memory`] -- In-process log and activity storage
//! - [`event_store`] -- `PostgreSQL` log
//! - [`activity_store`] -- Activity read model storage
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`error`] -- Shared error types

pub mod activity_store;
pub mod error;
pub mod event_log;
pub mod event_store;
pub mod memory;
pub mod postgres;

// Re-export primary types for convenience.
pub use activity_store::{ActivityRow, ActivityStore, PostgresActivityStore};
pub use error::DbError;
pub use event_log::EventLog;
pub use event_store::{PostgresEventStore, StreamEventRow};
pub use memory::{MemoryActivityStore, MemoryEventStore};
pub use postgres::{PostgresConfig, PostgresPool};
