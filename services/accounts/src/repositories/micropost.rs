//! Micropost repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Micropost, NewMicropost, Pagination};
use crate::store::MicropostStore;

fn row_to_micropost(row: &PgRow) -> Micropost {
    Micropost {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Micropost repository
#[derive(Clone)]
pub struct MicropostRepository {
    pool: PgPool,
}

impl MicropostRepository {
    /// Create a new micropost repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MicropostStore for MicropostRepository {
    async fn insert(&self, micropost: &NewMicropost) -> DatabaseResult<Micropost> {
        let row = sqlx::query(
            r#"
            INSERT INTO microposts (id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(micropost.user_id)
        .bind(&micropost.content)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row_to_micropost(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Micropost>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(row_to_micropost))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM microposts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Micropost>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(row_to_micropost).collect())
    }

    async fn feed(&self, user_id: Uuid, page: &Pagination) -> DatabaseResult<Vec<Micropost>> {
        debug!(
            "Loading feed for {} (page {}, {} per page)",
            user_id, page.page, page.per_page
        );

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE user_id = $1
               OR user_id IN (SELECT followed_id FROM relationships WHERE follower_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(row_to_micropost).collect())
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM microposts")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(count)
    }
}
