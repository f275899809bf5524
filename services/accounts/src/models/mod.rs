//! Account models

pub mod micropost;
pub mod pagination;
pub mod relationship;
pub mod user;

// Re-export for convenience
pub use micropost::{Micropost, NewMicropost};
pub use pagination::Pagination;
pub use relationship::Relationship;
pub use user::{NewUser, UpdateUser, User, UserAttributes};
