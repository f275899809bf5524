//! Storage ports used by the account service
//!
//! Implementations must enforce the case-insensitive uniqueness of user
//! emails themselves and report a violation as
//! [`DatabaseError::UniqueViolation`](common::error::DatabaseError).

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Micropost, NewMicropost, NewUser, Pagination, UpdateUser, User};

/// Durable storage of user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether another user already owns `email`, compared case-insensitively.
    /// The user `except` is ignored so a record does not collide with itself.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DatabaseResult<bool>;

    async fn insert(&self, user: &NewUser) -> DatabaseResult<User>;

    /// Apply `changes` and return the updated row, or `None` when `id` is gone
    async fn update(&self, id: Uuid, changes: &UpdateUser) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Remove the user together with its microposts and every relationship
    /// touching it, atomically. Returns whether the user existed.
    async fn destroy(&self, id: Uuid) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;
}

/// Durable storage of microposts
#[async_trait]
pub trait MicropostStore: Send + Sync {
    async fn insert(&self, micropost: &NewMicropost) -> DatabaseResult<Micropost>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Micropost>>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;

    /// Posts of one user, newest first
    async fn by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Micropost>>;

    /// Posts of `user_id` and of everyone it follows, newest first
    async fn feed(&self, user_id: Uuid, page: &Pagination) -> DatabaseResult<Vec<Micropost>>;

    async fn count(&self) -> DatabaseResult<i64>;
}

/// Durable storage of follow edges
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Add the edge `follower_id -> followed_id`. Returns false if it existed.
    async fn insert(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool>;

    /// Remove the edge. Returns false if there was none.
    async fn delete(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool>;

    async fn exists(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool>;

    /// Users followed by `user_id`, in the order they were followed
    async fn following(&self, user_id: Uuid) -> DatabaseResult<Vec<User>>;

    /// Users following `user_id`, in the order they started following
    async fn followers(&self, user_id: Uuid) -> DatabaseResult<Vec<User>>;
}
