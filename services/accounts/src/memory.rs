//! In-memory implementation of the storage ports
//!
//! One [`MemoryStore`] holds users, microposts and relationships behind a
//! single lock so that destroying a user cascades atomically, like the
//! PostgreSQL repositories do inside a transaction.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Micropost, NewMicropost, NewUser, Pagination, Relationship, UpdateUser, User,
};
use crate::store::{MicropostStore, RelationshipStore, UserStore};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_lower_key";

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Lowercased email -> user id
    email_index: HashMap<String, Uuid>,
    /// Insertion order
    microposts: Vec<Micropost>,
    /// Insertion order
    relationships: Vec<Relationship>,
}

impl State {
    fn users_by_id(&self, ids: impl Iterator<Item = Uuid>) -> Vec<User> {
        ids.filter_map(|id| self.users.get(&id).cloned()).collect()
    }
}

/// Newest first, later insertions winning ties
fn newest_first<'a>(posts: impl DoubleEndedIterator<Item = &'a Micropost>) -> Vec<Micropost> {
    let mut posts: Vec<Micropost> = posts.rev().cloned().collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DatabaseResult<bool> {
        let state = self.state.read().await;

        Ok(state
            .email_index
            .get(&email.to_lowercase())
            .is_some_and(|owner| Some(*owner) != except))
    }

    async fn insert(&self, user: &NewUser) -> DatabaseResult<User> {
        let mut state = self.state.write().await;

        let key = user.email.to_lowercase();
        if state.email_index.contains_key(&key) {
            return Err(DatabaseError::UniqueViolation(
                EMAIL_UNIQUE_CONSTRAINT.to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_digest: Some(user.password_digest.clone()),
            created_at: now,
            updated_at: now,
        };

        info!("Creating new user: {}", user.id);
        state.email_index.insert(key, user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: &UpdateUser) -> DatabaseResult<Option<User>> {
        let mut state = self.state.write().await;

        let Some(current) = state.users.get(&id).cloned() else {
            return Ok(None);
        };

        let old_key = current.email.to_lowercase();
        let new_key = changes
            .email
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| old_key.clone());

        if new_key != old_key {
            if state.email_index.contains_key(&new_key) {
                return Err(DatabaseError::UniqueViolation(
                    EMAIL_UNIQUE_CONSTRAINT.to_string(),
                ));
            }
            state.email_index.remove(&old_key);
            state.email_index.insert(new_key, id);
        }

        let updated = User {
            name: changes.name.clone().unwrap_or(current.name),
            email: changes.email.clone().unwrap_or(current.email),
            password_digest: changes
                .password_digest
                .clone()
                .or(current.password_digest),
            updated_at: Utc::now(),
            ..current
        };

        state.users.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;

        Ok(state
            .email_index
            .get(&email.to_lowercase())
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn destroy(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;

        let Some(user) = state.users.remove(&id) else {
            return Ok(false);
        };

        state.email_index.remove(&user.email.to_lowercase());
        state.microposts.retain(|post| post.user_id != id);
        state
            .relationships
            .retain(|edge| edge.follower_id != id && edge.followed_id != id);

        info!("Destroyed user: {}", id);
        Ok(true)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let state = self.state.read().await;
        Ok(state.users.len() as i64)
    }
}

#[async_trait]
impl MicropostStore for MemoryStore {
    async fn insert(&self, micropost: &NewMicropost) -> DatabaseResult<Micropost> {
        let mut state = self.state.write().await;

        let now = Utc::now();
        let micropost = Micropost {
            id: Uuid::new_v4(),
            user_id: micropost.user_id,
            content: micropost.content.clone(),
            created_at: now,
            updated_at: now,
        };

        state.microposts.push(micropost.clone());
        Ok(micropost)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Micropost>> {
        let state = self.state.read().await;
        Ok(state.microposts.iter().find(|post| post.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;

        let before = state.microposts.len();
        state.microposts.retain(|post| post.id != id);
        Ok(state.microposts.len() < before)
    }

    async fn by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Micropost>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.microposts.iter().filter(|post| post.user_id == user_id),
        ))
    }

    async fn feed(&self, user_id: Uuid, page: &Pagination) -> DatabaseResult<Vec<Micropost>> {
        let state = self.state.read().await;

        let followed: Vec<Uuid> = state
            .relationships
            .iter()
            .filter(|edge| edge.follower_id == user_id)
            .map(|edge| edge.followed_id)
            .collect();

        let posts = newest_first(
            state
                .microposts
                .iter()
                .filter(|post| post.user_id == user_id || followed.contains(&post.user_id)),
        );

        Ok(posts
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let state = self.state.read().await;
        Ok(state.microposts.len() as i64)
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn insert(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;

        let exists = state
            .relationships
            .iter()
            .any(|edge| edge.follower_id == follower_id && edge.followed_id == followed_id);
        if exists {
            return Ok(false);
        }

        state.relationships.push(Relationship {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn delete(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;

        let before = state.relationships.len();
        state
            .relationships
            .retain(|edge| !(edge.follower_id == follower_id && edge.followed_id == followed_id));
        Ok(state.relationships.len() < before)
    }

    async fn exists(&self, follower_id: Uuid, followed_id: Uuid) -> DatabaseResult<bool> {
        let state = self.state.read().await;

        Ok(state
            .relationships
            .iter()
            .any(|edge| edge.follower_id == follower_id && edge.followed_id == followed_id))
    }

    async fn following(&self, user_id: Uuid) -> DatabaseResult<Vec<User>> {
        let state = self.state.read().await;

        let ids = state
            .relationships
            .iter()
            .filter(|edge| edge.follower_id == user_id)
            .map(|edge| edge.followed_id);
        Ok(state.users_by_id(ids))
    }

    async fn followers(&self, user_id: Uuid) -> DatabaseResult<Vec<User>> {
        let state = self.state.read().await;

        let ids = state
            .relationships
            .iter()
            .filter(|edge| edge.followed_id == user_id)
            .map(|edge| edge.follower_id);
        Ok(state.users_by_id(ids))
    }
}
