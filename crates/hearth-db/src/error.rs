//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] and [`serde_json`] errors and carries the one domain-level
//! failure the log itself detects: an expected-version conflict.

use hearth_types::{ExpectedVersion, StreamKey};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The stream did not satisfy the append precondition.
    #[error("concurrency conflict on {stream}: expected {expected}, stream holds {actual} facts")]
    ConcurrencyConflict {
        /// Stream the append targeted.
        stream: StreamKey,
        /// Precondition the caller asked for.
        expected: ExpectedVersion,
        /// Number of facts the stream actually held.
        actual: u64,
    },

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored fact could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
