//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// PHC-formatted password digest. `None` only for records that were
    /// never given a password.
    #[serde(skip_serializing, default)]
    pub password_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user row, already validated and hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_digest: String,
}

/// User update payload, already validated and hashed
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_digest: Option<String>,
}

/// Attributes a user is saved from.
///
/// `id` is `None` for a record that has not been persisted yet. `password`
/// is `None` when an existing record keeps its current password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAttributes {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_confirmation: Option<String>,
}

impl UserAttributes {
    /// Attributes for a user that does not exist yet
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password: Some(password.into()),
            password_confirmation: None,
        }
    }

    /// Start editing a persisted user without touching the password
    pub fn from_user(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            password: None,
            password_confirmation: None,
        }
    }

    /// Set the password together with its confirmation
    pub fn with_password(
        mut self,
        password: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        self.password = Some(password.into());
        self.password_confirmation = Some(confirmation.into());
        self
    }

    /// Whether this describes a record that is not stored yet
    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Lowercase the email before it is validated and stored
    pub fn normalize(&mut self) {
        self.email = self.email.to_lowercase();
    }
}
