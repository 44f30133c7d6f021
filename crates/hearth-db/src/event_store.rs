//! `PostgreSQL` event log.
//!
//! Facts live in the `stream_events` table keyed by `(stream_key,
//! position)`. Appends to one stream are serialized with a
//! transaction-scoped advisory lock on the stream key. The expected-version
//! check and the insert then run in the same transaction. The primary key
//! backs this up: two writers can never both claim a position.

use chrono::{DateTime, Utc};
use hearth_types::{DomainEvent, ExpectedVersion, RecordedEvent, StreamKey};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `stream_events` table.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the full history of `stream` in append order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Serialization`] if a stored payload no longer decodes.
    pub async fn load(&self, stream: &StreamKey) -> Result<Vec<RecordedEvent>, DbError> {
        let rows = sqlx::query_as::<_, StreamEventRow>(
            r"SELECT position, event_type, payload, recorded_at
              FROM stream_events
              WHERE stream_key = $1
              ORDER BY position",
        )
        .bind(stream.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_recorded(stream))
            .collect()
    }

    /// Append one fact to `stream` if it satisfies `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConcurrencyConflict`] if the precondition fails
    /// (nothing is written), or [`DbError::Postgres`] on database failure.
    pub async fn append(
        &self,
        stream: &StreamKey,
        event: DomainEvent,
        expected: ExpectedVersion,
    ) -> Result<RecordedEvent, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(stream.as_str())
            .execute(&mut *tx)
            .await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stream_events WHERE stream_key = $1")
                .bind(stream.as_str())
                .fetch_one(&mut *tx)
                .await?;
        let current = u64::try_from(count).unwrap_or(0);

        if !expected.admits(current) {
            // Dropping `tx` rolls back and releases the advisory lock.
            return Err(DbError::ConcurrencyConflict {
                stream: stream.clone(),
                expected,
                actual: current,
            });
        }

        let position = current.saturating_add(1);
        let payload = serde_json::to_value(&event)?;

        let recorded_at: DateTime<Utc> = sqlx::query_scalar(
            r"INSERT INTO stream_events (stream_key, position, event_type, payload, recorded_at)
              VALUES ($1, $2, $3, $4, clock_timestamp())
              RETURNING recorded_at",
        )
        .bind(stream.as_str())
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .bind(event.event_type())
        .bind(&payload)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            stream = %stream,
            position,
            event_type = event.event_type(),
            "Appended fact"
        );

        Ok(RecordedEvent {
            stream: stream.clone(),
            position,
            recorded_at,
            event,
        })
    }
}

/// A row from the `stream_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StreamEventRow {
    /// 1-based position within the stream.
    pub position: i64,
    /// `snake_case` fact type (redundant with the payload tag; kept for SQL).
    pub event_type: String,
    /// The fact, as internally tagged JSON.
    pub payload: serde_json::Value,
    /// When the database accepted the fact.
    pub recorded_at: DateTime<Utc>,
}

impl StreamEventRow {
    fn into_recorded(self, stream: &StreamKey) -> Result<RecordedEvent, DbError> {
        Ok(RecordedEvent {
            stream: stream.clone(),
            position: u64::try_from(self.position).unwrap_or(0),
            recorded_at: self.recorded_at,
            event: serde_json::from_value(self.payload)?,
        })
    }
}
