//! User repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, UpdateUser, User};
use crate::store::UserStore;

pub(crate) const USER_COLUMNS: &str =
    "users.id, users.name, users.email, users.password_digest, users.created_at, users.updated_at";

pub(crate) fn row_to_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_digest: row.get("password_digest"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DatabaseResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1)
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(taken)
    }

    async fn insert(&self, user: &NewUser) -> DatabaseResult<User> {
        let id = Uuid::new_v4();
        info!("Creating new user: {}", id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, name, email, password_digest)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row_to_user(&row))
    }

    async fn update(&self, id: Uuid, changes: &UpdateUser) -> DatabaseResult<Option<User>> {
        info!("Updating user: {}", id);

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_digest = COALESCE($4, password_digest),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn destroy(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Destroying user: {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_query)?;

        let relationships = sqlx::query(
            "DELETE FROM relationships WHERE follower_id = $1 OR followed_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        let microposts = sqlx::query("DELETE FROM microposts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        if users.rows_affected() == 0 {
            tx.rollback().await.map_err(DatabaseError::from_query)?;
            return Ok(false);
        }

        tx.commit().await.map_err(DatabaseError::from_query)?;

        info!(
            "Destroyed user {} with {} microposts and {} relationships",
            id,
            microposts.rows_affected(),
            relationships.rows_affected()
        );
        Ok(true)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(count)
    }
}
