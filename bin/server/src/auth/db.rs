//! PostgreSQL user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use wongnok_core::UserId;
use wongnok_platform_access::{User, UserError};

use crate::user::UserStore;

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    nick_name: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::with_all_fields(
            UserId::new(row.id),
            row.first_name,
            row.last_name,
            row.nick_name,
            row.image_url,
            row.created_at,
            row.updated_at,
        )
    }
}

/// User store backed by the `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new user store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &UserId) -> wongnok_core::Result<Option<User>, UserError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, nick_name, image_url, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::FindFailed {
            details: e.to_string(),
        })?;

        Ok(row.map(User::from))
    }

    async fn upsert(&self, user: &User) -> wongnok_core::Result<(), UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, nick_name, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                nick_name = EXCLUDED.nick_name,
                image_url = EXCLUDED.image_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.nick_name())
        .bind(user.image_url())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::UpsertFailed {
            details: e.to_string(),
        })?;

        Ok(())
    }
}
