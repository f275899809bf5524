//! Account service: validated user records, the follow graph and the feed

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::{Micropost, NewMicropost, NewUser, Pagination, UpdateUser, User, UserAttributes};
use crate::password::CredentialHasher;
use crate::store::{MicropostStore, RelationshipStore, UserStore};
use crate::validation::{ValidationErrors, validate_content};

/// Entry point for every user operation
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    microposts: Arc<dyn MicropostStore>,
    relationships: Arc<dyn RelationshipStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountService {
    /// Create a new account service
    pub fn new(
        users: Arc<dyn UserStore>,
        microposts: Arc<dyn MicropostStore>,
        relationships: Arc<dyn RelationshipStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            users,
            microposts,
            relationships,
            hasher,
        }
    }

    /// Build a service whose three stores are the same value, such as a
    /// [`MemoryStore`](crate::memory::MemoryStore)
    pub fn with_store<S>(store: S, hasher: Arc<dyn CredentialHasher>) -> Self
    where
        S: UserStore + MicropostStore + RelationshipStore + Clone + 'static,
    {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            hasher,
        )
    }

    /// Validate a candidate without saving it.
    ///
    /// Every field is checked, including case-insensitive email uniqueness
    /// against persisted users other than the candidate itself.
    pub async fn validate(&self, candidate: &UserAttributes) -> AccountResult<()> {
        let mut errors = candidate.validate_fields();

        if !errors.contains("email")
            && self
                .users
                .email_taken(&candidate.email, candidate.id)
                .await?
        {
            errors.add("email", "has already been taken");
        }

        errors.into_result().map_err(AccountError::Validation)
    }

    /// Normalize, validate and persist a candidate.
    ///
    /// New records are inserted, persisted ones updated. The password is
    /// hashed only when one was given.
    pub async fn save(&self, mut candidate: UserAttributes) -> AccountResult<User> {
        candidate.normalize();
        self.validate(&candidate).await?;

        let password_digest = match candidate.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        match candidate.id {
            None => {
                let Some(password_digest) = password_digest else {
                    let mut errors = ValidationErrors::new();
                    errors.add("password", "can't be blank");
                    return Err(errors.into());
                };

                let user = self
                    .users
                    .insert(&NewUser {
                        name: candidate.name,
                        email: candidate.email,
                        password_digest,
                    })
                    .await?;

                info!("User {} created", user.id);
                Ok(user)
            }
            Some(id) => {
                let changes = UpdateUser {
                    name: Some(candidate.name),
                    email: Some(candidate.email),
                    password_digest,
                };

                let user = self
                    .users
                    .update(id, &changes)
                    .await?
                    .ok_or(AccountError::UserNotFound(id))?;

                info!("User {} updated", user.id);
                Ok(user)
            }
        }
    }

    pub async fn find(&self, id: Uuid) -> AccountResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Case-insensitive lookup by email
    pub async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn user_count(&self) -> AccountResult<i64> {
        Ok(self.users.count().await?)
    }

    /// Check a raw password against the user's digest.
    ///
    /// A missing or unreadable digest fails the check instead of erroring.
    pub fn authenticate(&self, user: &User, raw_password: &str) -> bool {
        match user.password_digest.as_deref() {
            Some(digest) => self.hasher.verify(digest, raw_password),
            None => {
                debug!("User {} has no password digest", user.id);
                false
            }
        }
    }

    /// Look a user up by email and check the password
    pub async fn authenticate_by_email(
        &self,
        email: &str,
        raw_password: &str,
    ) -> AccountResult<Option<User>> {
        let user = self.users.find_by_email(email).await?;

        Ok(user.filter(|user| self.authenticate(user, raw_password)))
    }

    /// Remove a user with its microposts and every follow edge touching it
    pub async fn destroy(&self, id: Uuid) -> AccountResult<()> {
        if !self.users.destroy(id).await? {
            return Err(AccountError::UserNotFound(id));
        }

        info!("User {} destroyed", id);
        Ok(())
    }

    /// Make `follower_id` follow `followed_id`. Following twice is a no-op.
    pub async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> AccountResult<()> {
        if follower_id == followed_id {
            let mut errors = ValidationErrors::new();
            errors.add("followed_id", "can't be the follower");
            return Err(errors.into());
        }

        self.require_user(follower_id).await?;
        self.require_user(followed_id).await?;

        if self.relationships.insert(follower_id, followed_id).await? {
            info!("User {} now follows {}", follower_id, followed_id);
        } else {
            debug!("User {} already follows {}", follower_id, followed_id);
        }

        Ok(())
    }

    /// Remove the edge if present. Unfollowing someone not followed is a no-op.
    pub async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> AccountResult<()> {
        if self.relationships.delete(follower_id, followed_id).await? {
            info!("User {} unfollowed {}", follower_id, followed_id);
        }

        Ok(())
    }

    pub async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> AccountResult<bool> {
        Ok(self.relationships.exists(follower_id, followed_id).await?)
    }

    /// Users `user_id` follows
    pub async fn following(&self, user_id: Uuid) -> AccountResult<Vec<User>> {
        Ok(self.relationships.following(user_id).await?)
    }

    /// Users following `user_id`
    pub async fn followers(&self, user_id: Uuid) -> AccountResult<Vec<User>> {
        Ok(self.relationships.followers(user_id).await?)
    }

    /// Publish a micropost for `user_id`
    pub async fn post(&self, user_id: Uuid, content: &str) -> AccountResult<Micropost> {
        let mut errors = ValidationErrors::new();
        validate_content(content, &mut errors);
        errors.into_result()?;

        self.require_user(user_id).await?;

        let micropost = self
            .microposts
            .insert(&NewMicropost {
                user_id,
                content: content.to_string(),
            })
            .await?;

        debug!("User {} posted {}", user_id, micropost.id);
        Ok(micropost)
    }

    /// Posts authored by `user_id`, newest first
    pub async fn microposts(&self, user_id: Uuid) -> AccountResult<Vec<Micropost>> {
        Ok(self.microposts.by_user(user_id).await?)
    }

    pub async fn delete_micropost(&self, id: Uuid) -> AccountResult<()> {
        if !self.microposts.delete(id).await? {
            return Err(AccountError::MicropostNotFound(id));
        }

        Ok(())
    }

    pub async fn micropost_count(&self) -> AccountResult<i64> {
        Ok(self.microposts.count().await?)
    }

    /// Posts by `user_id` and everyone it follows, most recent first
    pub async fn feed(&self, user_id: Uuid, page: Pagination) -> AccountResult<Vec<Micropost>> {
        Ok(self.microposts.feed(user_id, &page).await?)
    }

    async fn require_user(&self, id: Uuid) -> AccountResult<User> {
        match self.users.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!("User {} does not exist", id);
                Err(AccountError::UserNotFound(id))
            }
        }
    }
}
