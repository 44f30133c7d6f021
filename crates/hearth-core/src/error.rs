//! Error types for the command and query layer.

use hearth_db::DbError;
use hearth_types::StreamKey;

/// Errors returned by [`crate::HouseholdService`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The stream did not satisfy the append's expected version. Terminal:
    /// the command is never retried.
    #[error("concurrency conflict on stream {stream}")]
    Conflict {
        /// Stream the append targeted.
        stream: StreamKey,
    },

    /// A command argument failed validation before anything was appended.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The pin is not 4 to 12 digits.
    #[error("pin must be 4 to 12 digits")]
    InvalidPin,

    /// The invite presented at join is not the household's current invite.
    #[error("invite is not the household's current invite")]
    StaleInvite,

    /// The event log or read model storage failed.
    #[error("storage error: {0}")]
    Log(DbError),

    /// The blocking pin hashing task did not complete.
    #[error("pin hashing task failed: {0}")]
    Hashing(String),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConcurrencyConflict { stream, .. } => Self::Conflict { stream },
            other => Self::Log(other),
        }
    }
}
