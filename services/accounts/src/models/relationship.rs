//! Follow relationship model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Directed edge of the follow graph: `follower_id` follows `followed_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Relationship {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}
