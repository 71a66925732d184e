//! PostgreSQL implementation of UserStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{User, UserStatus};
use crate::ports::{OutboxRow, UserStore};

use super::{db_error, PgOutboxStore, UNIQUE_VIOLATION};

/// PostgreSQL implementation of `UserStore`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new PgUserStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User, event: OutboxRow) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.name())
        .bind(user.email())
        .bind(user.status().to_string())
        .bind(user.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // The unique index backs the email invariant; the precheck in the
            // command handler only narrows the window.
            if e.as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == UNIQUE_VIOLATION)
            {
                DomainError::new(
                    ErrorCode::DuplicateEmail,
                    format!("Email '{}' is already registered", user.email()),
                )
            } else {
                db_error("Failed to insert user", e)
            }
        })?;

        PgOutboxStore::append(&mut tx, &event).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit user insert", e))
    }

    async fn update_status(
        &self,
        user: &User,
        event: Option<OutboxRow>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(user.id().as_uuid())
            .bind(user.status().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to update user status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", user.id()),
            ));
        }

        if let Some(row) = event {
            PgOutboxStore::append(&mut tx, &row).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit status update", e))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, email, status, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, email, status, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user by email", e))?;

        row.map(row_to_user).transpose()
    }
}

fn row_to_user(row: PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read user row", e);

    let status_text: String = row.try_get("status").map_err(read)?;
    let status = UserStatus::parse(&status_text).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Unknown user status in database: '{}'", status_text),
        )
    })?;

    Ok(User::from_parts(
        UserId::from_uuid(row.try_get("id").map_err(read)?),
        row.try_get("name").map_err(read)?,
        row.try_get("email").map_err(read)?,
        status,
        Timestamp::from_datetime(row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?),
    ))
}
