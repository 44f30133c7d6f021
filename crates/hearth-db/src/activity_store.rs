//! Storage for the materialized activity read model.
//!
//! The activity list is the one view that is persisted instead of folded on
//! every read. It is only ever written wholesale: [`ActivityStore::replace`]
//! swaps a household's entire list so readers see the old list or the new
//! one, never a mix.

use chrono::{DateTime, Utc};
use hearth_types::{ActivityEntry, ChoreId, HouseholdId, MemberId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::memory::MemoryActivityStore;

/// Activity storage backend.
///
/// Uses enum dispatch instead of trait objects because async methods are
/// not dyn-compatible.
#[derive(Debug)]
pub enum ActivityStore {
    /// In-process storage.
    Memory(MemoryActivityStore),
    /// `PostgreSQL` `activities` table.
    Postgres(PostgresActivityStore),
}

impl ActivityStore {
    /// A fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryActivityStore::new())
    }

    /// Atomically replace everything materialized for `household_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the replacement transaction fails,
    /// in which case the previous list is still in place.
    pub async fn replace(
        &self,
        household_id: HouseholdId,
        entries: Vec<ActivityEntry>,
    ) -> Result<(), DbError> {
        match self {
            Self::Memory(store) => {
                store.replace(household_id, entries).await;
                Ok(())
            }
            Self::Postgres(store) => store.replace(household_id, &entries).await,
        }
    }

    /// Materialized entries for `household_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, household_id: HouseholdId) -> Result<Vec<ActivityEntry>, DbError> {
        match self {
            Self::Memory(store) => Ok(store.get(household_id).await),
            Self::Postgres(store) => store.get(household_id).await,
        }
    }
}

/// Operations on the `activities` table.
#[derive(Debug, Clone)]
pub struct PostgresActivityStore {
    pool: PgPool,
}

impl PostgresActivityStore {
    /// Create a new activity store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete and re-insert a household's entries inside one transaction.
    ///
    /// Uses a single UNNEST-based INSERT for the whole list.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any statement fails; the
    /// transaction is rolled back.
    pub async fn replace(
        &self,
        household_id: HouseholdId,
        entries: &[ActivityEntry],
    ) -> Result<(), DbError> {
        let len = entries.len();
        let mut sequences = Vec::with_capacity(len);
        let mut kinds = Vec::with_capacity(len);
        let mut descriptions = Vec::with_capacity(len);
        let mut member_ids: Vec<Option<Uuid>> = Vec::with_capacity(len);
        let mut chore_ids: Vec<Option<Uuid>> = Vec::with_capacity(len);
        let mut occurred = Vec::with_capacity(len);

        for entry in entries {
            sequences.push(i64::try_from(entry.sequence).unwrap_or(i64::MAX));
            kinds.push(entry.kind.clone());
            descriptions.push(entry.description.clone());
            member_ids.push(entry.member_id.map(MemberId::into_inner));
            chore_ids.push(entry.chore_id.map(ChoreId::into_inner));
            occurred.push(entry.occurred_at);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM activities WHERE household_id = $1")
            .bind(household_id.into_inner())
            .execute(&mut *tx)
            .await?;

        if !entries.is_empty() {
            sqlx::query(
                r"INSERT INTO activities (household_id, sequence, kind, description, member_id, chore_id, occurred_at)
                  SELECT $1::UUID, * FROM UNNEST($2::BIGINT[], $3::TEXT[], $4::TEXT[], $5::UUID[], $6::UUID[], $7::TIMESTAMPTZ[])",
            )
            .bind(household_id.into_inner())
            .bind(&sequences)
            .bind(&kinds)
            .bind(&descriptions)
            .bind(&member_ids)
            .bind(&chore_ids)
            .bind(&occurred)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(household_id = %household_id, count = len, "Replaced activity entries");
        Ok(())
    }

    /// Entries for `household_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, household_id: HouseholdId) -> Result<Vec<ActivityEntry>, DbError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r"SELECT household_id, sequence, kind, description, member_id, chore_id, occurred_at
              FROM activities
              WHERE household_id = $1
              ORDER BY occurred_at DESC, sequence DESC",
        )
        .bind(household_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }
}

/// A row from the `activities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    /// Owning household.
    pub household_id: Uuid,
    /// Rebuild order.
    pub sequence: i64,
    /// Fact type.
    pub kind: String,
    /// Human-readable sentence.
    pub description: String,
    /// Member the entry is about.
    pub member_id: Option<Uuid>,
    /// Chore the entry is about.
    pub chore_id: Option<Uuid>,
    /// When the fact was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            household_id: HouseholdId::from(row.household_id),
            sequence: u64::try_from(row.sequence).unwrap_or(0),
            kind: row.kind,
            description: row.description,
            member_id: row.member_id.map(MemberId::from),
            chore_id: row.chore_id.map(ChoreId::from),
            occurred_at: row.occurred_at,
        }
    }
}
