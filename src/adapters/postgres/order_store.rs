//! PostgreSQL implementation of OrderStore.
//!
//! `transition` re-checks each order's status inside the UPDATE itself
//! (`status = ANY(expected)`), which is what keeps the cascade handler and
//! the expiry scanner idempotent: a change that no longer applies affects
//! zero rows and appends no outbox row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Money, OrderId, Timestamp, UserId};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{OrderStore, OrderTransition, OutboxRow};

use super::{db_error, PgOutboxStore};

/// PostgreSQL implementation of `OrderStore`.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Creates a new PgOrderStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order, event: OutboxRow) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, product, quantity, price_cents, status,
                created_at, expires_at, cancelled_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.product())
        .bind(order.quantity() as i32)
        .bind(order.price().cents())
        .bind(order.status().to_string())
        .bind(order.created_at().as_datetime())
        .bind(order.expires_at().as_datetime())
        .bind(order.cancelled_at().map(|t| *t.as_datetime()))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert order", e))?;

        PgOutboxStore::append(&mut tx, &event).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit order insert", e))
    }

    async fn update_status(
        &self,
        order: &Order,
        event: Option<OutboxRow>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let result =
            sqlx::query("UPDATE orders SET status = $2, cancelled_at = $3 WHERE id = $1")
                .bind(order.id().as_uuid())
                .bind(order.status().to_string())
                .bind(order.cancelled_at().map(|t| *t.as_datetime()))
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to update order status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order.id()),
            ));
        }

        if let Some(row) = event {
            PgOutboxStore::append(&mut tx, &row).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit status update", e))
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, product, quantity, price_cents, status,
                   created_at, expires_at, cancelled_at
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch order", e))?;

        row.map(row_to_order).transpose()
    }

    async fn list_by_user_in(
        &self,
        user_id: &UserId,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError> {
        let status_texts: Vec<String> = statuses.iter().map(ToString::to_string).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product, quantity, price_cents, status,
                   created_at, expires_at, cancelled_at
            FROM orders
            WHERE user_id = $1 AND status = ANY($2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&status_texts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list orders by user", e))?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn list_expired(
        &self,
        now: Timestamp,
        statuses: &[OrderStatus],
        limit: u32,
    ) -> Result<Vec<Order>, DomainError> {
        let status_texts: Vec<String> = statuses.iter().map(ToString::to_string).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product, quantity, price_cents, status,
                   created_at, expires_at, cancelled_at
            FROM orders
            WHERE status = ANY($1) AND expires_at <= $2
            ORDER BY expires_at ASC
            LIMIT $3
            "#,
        )
        .bind(&status_texts)
        .bind(now.as_datetime())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list expired orders", e))?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn transition(&self, changes: Vec<OrderTransition>) -> Result<u32, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let mut applied = 0;
        for change in changes {
            let expected: Vec<String> = change.expected.iter().map(ToString::to_string).collect();

            let result = sqlx::query(
                r#"
                UPDATE orders SET status = $2, cancelled_at = $3
                WHERE id = $1 AND status = ANY($4)
                "#,
            )
            .bind(change.order_id.as_uuid())
            .bind(change.to.to_string())
            .bind(change.cancelled_at.map(|t| *t.as_datetime()))
            .bind(&expected)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to transition order", e))?;

            if result.rows_affected() == 1 {
                PgOutboxStore::append(&mut tx, &change.outbox).await?;
                applied += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit order transitions", e))?;
        Ok(applied)
    }
}

fn row_to_order(row: PgRow) -> Result<Order, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read order row", e);

    let status_text: String = row.try_get("status").map_err(read)?;
    let status = OrderStatus::parse(&status_text).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Unknown order status in database: '{}'", status_text),
        )
    })?;

    Ok(Order::from_parts(
        OrderId::from_uuid(row.try_get("id").map_err(read)?),
        UserId::from_uuid(row.try_get("user_id").map_err(read)?),
        row.try_get("product").map_err(read)?,
        row.try_get::<i32, _>("quantity").map_err(read)? as u32,
        Money::from_cents(row.try_get::<i64, _>("price_cents").map_err(read)?),
        status,
        Timestamp::from_datetime(row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?),
        Timestamp::from_datetime(row.try_get::<DateTime<Utc>, _>("expires_at").map_err(read)?),
        row.try_get::<Option<DateTime<Utc>>, _>("cancelled_at")
            .map_err(read)?
            .map(Timestamp::from_datetime),
    ))
}
