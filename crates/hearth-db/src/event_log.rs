//! The event log contract consumed by the command and query layer.
//!
//! [`EventLog`] exposes exactly three operations: `load`, its synonym
//! `fetch`, and `append` with an [`ExpectedVersion`] precondition. Both
//! backends honor the same contract: reads return the complete
//! append-ordered history of one stream, and an append is either fully
//! visible or rejected.

use hearth_types::{DomainEvent, ExpectedVersion, RecordedEvent, StreamKey};

use crate::error::DbError;
use crate::event_store::PostgresEventStore;
use crate::memory::MemoryEventStore;

/// An append-only, per-stream ordered log of facts.
///
/// Uses enum dispatch instead of trait objects because async methods are
/// not dyn-compatible.
#[derive(Debug)]
pub enum EventLog {
    /// In-process log; lost on restart.
    Memory(MemoryEventStore),
    /// Durable log in `PostgreSQL`.
    Postgres(PostgresEventStore),
}

impl EventLog {
    /// A fresh, empty in-memory log.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryEventStore::new())
    }

    /// Human-readable backend name for logging.
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Complete history of `stream` in append order. An unknown stream is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read.
    pub async fn load(&self, stream: &StreamKey) -> Result<Vec<RecordedEvent>, DbError> {
        match self {
            Self::Memory(store) => Ok(store.load(stream).await),
            Self::Postgres(store) => store.load(stream).await,
        }
    }

    /// Synonym for [`EventLog::load`] with identical ordering guarantees.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read.
    pub async fn fetch(&self, stream: &StreamKey) -> Result<Vec<RecordedEvent>, DbError> {
        self.load(stream).await
    }

    /// Append `event` to `stream` under `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConcurrencyConflict`] if the stream does not
    /// satisfy `expected`; any other variant is a backend failure.
    pub async fn append(
        &self,
        stream: &StreamKey,
        event: DomainEvent,
        expected: ExpectedVersion,
    ) -> Result<RecordedEvent, DbError> {
        match self {
            Self::Memory(store) => store.append(stream, event, expected).await,
            Self::Postgres(store) => store.append(stream, event, expected).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use hearth_types::{stream_key, HouseholdId, MemberId, StreamKind};

    use super::*;

    #[tokio::test]
    async fn load_and_fetch_agree() {
        let log = EventLog::in_memory();
        let key = stream_key(StreamKind::Household, HouseholdId::new());
        for _ in 0..3 {
            let appended = log
                .append(
                    &key,
                    DomainEvent::MemberRemoved {
                        member_id: MemberId::new(),
                    },
                    ExpectedVersion::Any,
                )
                .await;
            assert!(appended.is_ok());
        }

        let loaded = log.load(&key).await.ok();
        let fetched = log.fetch(&key).await.ok();
        assert_eq!(loaded, fetched);
        assert_eq!(loaded.map(|l| l.len()), Some(3));
        assert_eq!(log.backend(), "memory");
    }
}
