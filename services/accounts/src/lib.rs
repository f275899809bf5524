//! User accounts for a small social application
//!
//! Users carry a validated name and email and an Argon2 password digest.
//! They follow each other, publish microposts, and read a feed made of their
//! own posts and the posts of everyone they follow.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use accounts::memory::MemoryStore;
//! use accounts::models::{Pagination, UserAttributes};
//! use accounts::password::{Argon2Hasher, HashingConfig};
//! use accounts::service::AccountService;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let hasher = Arc::new(Argon2Hasher::new(HashingConfig::default())?);
//! let service = AccountService::with_store(MemoryStore::new(), hasher);
//!
//! let alice = service
//!     .save(UserAttributes::new("Alice", "Alice@Example.com", "foobar"))
//!     .await?;
//! assert_eq!(alice.email, "alice@example.com");
//!
//! service.post(alice.id, "Hello").await?;
//! let feed = service.feed(alice.id, Pagination::default()).await?;
//! assert_eq!(feed.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;
pub mod schema;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use error::{AccountError, AccountResult};
pub use service::AccountService;
