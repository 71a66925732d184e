//! PostgreSQL implementation of OutboxStore.
//!
//! Acquisition uses a lease column pair (`locked_until`, `locked_by`)
//! updated under `FOR UPDATE SKIP LOCKED`, so several drainer instances can
//! run against the same table without handing out the same row twice. A
//! crashed drainer's rows become visible again once their lease expires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{OutboxRow, OutboxStore};

use super::db_error;

/// PostgreSQL implementation of `OutboxStore`.
#[derive(Clone)]
pub struct PgOutboxStore {
    pool: PgPool,
    /// Identifies this process's leases in `locked_by`.
    instance_id: Uuid,
    /// Rows beyond this retry count are left alone entirely.
    retry_cap: u32,
}

impl PgOutboxStore {
    /// Creates a store. `retry_cap` should equal the publisher's retry
    /// maximum: a row at the cap is still acquired once more so the
    /// publisher can route it to the dead-letter topic.
    pub fn new(pool: PgPool, retry_cap: u32) -> Self {
        Self {
            pool,
            instance_id: Uuid::new_v4(),
            retry_cap,
        }
    }

    /// Appends a pending row inside an open transaction. The row becomes
    /// durable iff the enclosing transaction commits.
    pub async fn append(
        tx: &mut Transaction<'_, Postgres>,
        row: &OutboxRow,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO outbox (
                id, event_type, aggregate_id, payload, retry_count, created_at, sent_at, last_error
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(&row.event_type)
        .bind(&row.aggregate_id)
        .bind(&row.payload)
        .bind(row.retry_count as i32)
        .bind(row.created_at.as_datetime())
        .bind(row.sent_at.map(|t| *t.as_datetime()))
        .bind(&row.last_error)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to append outbox row", e))?;

        Ok(())
    }
}

#[async_trait]
impl OutboxStore for PgOutboxStore {
    async fn acquire_batch(
        &self,
        limit: u32,
        lock_for: Duration,
    ) -> Result<Vec<OutboxRow>, DomainError> {
        let now = Utc::now();
        let lease_until = now + chrono::Duration::seconds(lock_for.as_secs() as i64);

        let rows = sqlx::query(
            r#"
            UPDATE outbox SET locked_until = $1, locked_by = $2
            WHERE id IN (
                SELECT id FROM outbox
                WHERE sent_at IS NULL
                  AND retry_count <= $3
                  AND (locked_until IS NULL OR locked_until < $4)
                ORDER BY created_at ASC
                LIMIT $5
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, event_type, aggregate_id, payload, retry_count,
                      created_at, sent_at, last_error
            "#,
        )
        .bind(lease_until)
        .bind(self.instance_id)
        .bind(self.retry_cap as i32)
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to acquire outbox batch", e))?;

        let mut batch: Vec<OutboxRow> = rows
            .into_iter()
            .map(row_to_outbox)
            .collect::<Result<_, _>>()?;
        // RETURNING gives no ordering guarantee; restore creation order.
        batch.sort_by_key(|r| r.created_at);
        Ok(batch)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE outbox
            SET sent_at = COALESCE(sent_at, $2), locked_until = NULL, locked_by = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark outbox row sent", e))?;

        if result.rows_affected() == 0 {
            return Err(row_not_found(id));
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        retry_count: u32,
        error: &str,
        permanent: bool,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE outbox
            SET retry_count = GREATEST(retry_count, $2),
                last_error = $3,
                sent_at = CASE WHEN $4 THEN COALESCE(sent_at, $5) ELSE sent_at END,
                locked_until = NULL,
                locked_by = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(retry_count as i32)
        .bind(error)
        .bind(permanent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark outbox row failed", e))?;

        if result.rows_affected() == 0 {
            return Err(row_not_found(id));
        }
        Ok(())
    }

    async fn list_unsent(&self, limit: u32) -> Result<Vec<OutboxRow>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, aggregate_id, payload, retry_count,
                   created_at, sent_at, last_error
            FROM outbox
            WHERE sent_at IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list unsent outbox rows", e))?;

        rows.into_iter().map(row_to_outbox).collect()
    }

    async fn increment_retry(&self, id: Uuid) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE outbox SET retry_count = retry_count + 1 WHERE id = $1 AND sent_at IS NULL")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to increment outbox retry count", e))?;

        if result.rows_affected() == 0 {
            return Err(row_not_found(id));
        }
        Ok(())
    }
}

fn row_not_found(id: Uuid) -> DomainError {
    DomainError::new(
        ErrorCode::OutboxRowNotFound,
        format!("Outbox row not found: {}", id),
    )
}

fn row_to_outbox(row: PgRow) -> Result<OutboxRow, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read outbox row", e);

    Ok(OutboxRow {
        id: row.try_get("id").map_err(read)?,
        event_type: row.try_get("event_type").map_err(read)?,
        aggregate_id: row.try_get("aggregate_id").map_err(read)?,
        payload: row.try_get::<JsonValue, _>("payload").map_err(read)?,
        retry_count: row.try_get::<i32, _>("retry_count").map_err(read)? as u32,
        created_at: Timestamp::from_datetime(row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?),
        sent_at: row
            .try_get::<Option<DateTime<Utc>>, _>("sent_at")
            .map_err(read)?
            .map(Timestamp::from_datetime),
        last_error: row.try_get("last_error").map_err(read)?,
    })
}
