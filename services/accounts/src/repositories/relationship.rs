//! Relationship repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{USER_COLUMNS, row_to_user};
use crate::models::User;
use crate::store::RelationshipStore;

/// Relationship repository
#[derive(Clone)]
pub struct RelationshipRepository {
    pool: PgPool,
}

impl RelationshipRepository {
    /// Create a new relationship repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipStore for RelationshipRepository {
    async fn insert(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO relationships (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "DELETE FROM relationships WHERE follower_id = $1 AND followed_id = $2",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM relationships WHERE follower_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(exists)
    }

    async fn following(&self, user_id: Uuid) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM users
            JOIN relationships ON relationships.followed_id = users.id
            WHERE relationships.follower_id = $1
            ORDER BY relationships.created_at, users.id
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn followers(&self, user_id: Uuid) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM users
            JOIN relationships ON relationships.follower_id = users.id
            WHERE relationships.followed_id = $1
            ORDER BY relationships.created_at, users.id
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(row_to_user).collect())
    }
}
