//! PostgreSQL implementations of the storage ports

pub mod micropost;
pub mod relationship;
pub mod user;

pub use micropost::MicropostRepository;
pub use relationship::RelationshipRepository;
pub use user::UserRepository;
