//! In-process stores.
//!
//! Used when no database URL is configured and throughout the test suite.
//! Both stores hold their data behind a single [`RwLock`], so an append (or
//! a read-model swap) is observed either fully or not at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use hearth_types::{ActivityEntry, DomainEvent, ExpectedVersion, HouseholdId, RecordedEvent, StreamKey};
use tokio::sync::RwLock;

use crate::error::DbError;

/// Append-only event log held in memory.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    streams: RwLock<BTreeMap<StreamKey, Vec<RecordedEvent>>>,
}

impl MemoryEventStore {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full history of `stream` in append order. Unknown streams are
    /// empty, not an error.
    pub async fn load(&self, stream: &StreamKey) -> Vec<RecordedEvent> {
        self.streams
            .read()
            .await
            .get(stream)
            .cloned()
            .unwrap_or_default()
    }

    /// Append `event` to `stream` if the stream satisfies `expected`.
    ///
    /// The precondition check and the push happen under one write lock.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConcurrencyConflict`] if the precondition fails.
    pub async fn append(
        &self,
        stream: &StreamKey,
        event: DomainEvent,
        expected: ExpectedVersion,
    ) -> Result<RecordedEvent, DbError> {
        let mut streams = self.streams.write().await;
        let entries = streams.entry(stream.clone()).or_default();
        let current = u64::try_from(entries.len()).unwrap_or(u64::MAX);

        if !expected.admits(current) {
            return Err(DbError::ConcurrencyConflict {
                stream: stream.clone(),
                expected,
                actual: current,
            });
        }

        let recorded = RecordedEvent {
            stream: stream.clone(),
            position: current.saturating_add(1),
            recorded_at: Utc::now(),
            event,
        };
        entries.push(recorded.clone());
        Ok(recorded)
    }
}

/// Materialized activity entries held in memory.
///
/// Each household's list sits behind its own [`Arc`]; a rebuild swaps the
/// whole `Arc` in one write, so readers holding the old one keep a complete
/// (if stale) list.
#[derive(Debug, Default)]
pub struct MemoryActivityStore {
    households: RwLock<BTreeMap<HouseholdId, Arc<Vec<ActivityEntry>>>>,
}

impl MemoryActivityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything materialized for `household_id`.
    pub async fn replace(&self, household_id: HouseholdId, mut entries: Vec<ActivityEntry>) {
        entries.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        self.households
            .write()
            .await
            .insert(household_id, Arc::new(entries));
    }

    /// Entries for `household_id`, newest first.
    pub async fn get(&self, household_id: HouseholdId) -> Vec<ActivityEntry> {
        let snapshot = self.households.read().await.get(&household_id).cloned();
        snapshot.map(|list| list.as_ref().clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hearth_types::{stream_key, MemberId, StreamKind};

    use super::*;

    fn removed() -> DomainEvent {
        DomainEvent::MemberRemoved {
            member_id: MemberId::new(),
        }
    }

    #[tokio::test]
    async fn unknown_stream_loads_empty() {
        let store = MemoryEventStore::new();
        let key = stream_key(StreamKind::Household, HouseholdId::new());
        assert!(store.load(&key).await.is_empty());
    }

    #[tokio::test]
    async fn appends_are_positioned_in_order() {
        let store = MemoryEventStore::new();
        let key = stream_key(StreamKind::Household, HouseholdId::new());
        let first = store.append(&key, removed(), ExpectedVersion::Any).await.unwrap();
        let second = store.append(&key, removed(), ExpectedVersion::Any).await.unwrap();
        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);

        let loaded = store.load(&key).await;
        assert_eq!(loaded, vec![first, second]);
    }

    #[tokio::test]
    async fn no_stream_rejects_non_empty() {
        let store = MemoryEventStore::new();
        let key = stream_key(StreamKind::Household, HouseholdId::new());
        assert!(store.append(&key, removed(), ExpectedVersion::NoStream).await.is_ok());

        let err = store.append(&key, removed(), ExpectedVersion::NoStream).await;
        assert!(matches!(
            err,
            Err(DbError::ConcurrencyConflict { actual: 1, .. })
        ));
        assert_eq!(store.load(&key).await.len(), 1);
    }

    #[tokio::test]
    async fn exact_version_is_checked() {
        let store = MemoryEventStore::new();
        let key = stream_key(StreamKind::Chores, HouseholdId::new());
        assert!(store.append(&key, removed(), ExpectedVersion::Exact(0)).await.is_ok());
        assert!(store.append(&key, removed(), ExpectedVersion::Exact(0)).await.is_err());
        assert!(store.append(&key, removed(), ExpectedVersion::Exact(1)).await.is_ok());
    }

    #[tokio::test]
    async fn streams_are_isolated() {
        let store = MemoryEventStore::new();
        let id = HouseholdId::new();
        let household = stream_key(StreamKind::Household, id);
        let chores = stream_key(StreamKind::Chores, id);
        store.append(&household, removed(), ExpectedVersion::Any).await.unwrap();
        assert!(store.load(&chores).await.is_empty());
        assert!(store.append(&chores, removed(), ExpectedVersion::NoStream).await.is_ok());
    }

    #[tokio::test]
    async fn activity_replace_sorts_newest_first() {
        let store = MemoryActivityStore::new();
        let id = HouseholdId::new();
        let now = Utc::now();
        let entry = |sequence: u64, age_secs: i64| ActivityEntry {
            household_id: id,
            sequence,
            kind: String::from("member_removed"),
            description: String::new(),
            member_id: None,
            chore_id: None,
            occurred_at: now - chrono::Duration::seconds(age_secs),
        };
        store.replace(id, vec![entry(0, 30), entry(1, 10), entry(2, 10)]).await;

        let seqs: Vec<u64> = store.get(id).await.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![2, 1, 0]);
        assert!(store.get(HouseholdId::new()).await.is_empty());
    }
}
