//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use accounts::AccountService;
use accounts::memory::MemoryStore;
use accounts::models::{User, UserAttributes};
use accounts::password::{Argon2Hasher, HashingConfig};

/// Service over a fresh in-memory store with cheap hashing
pub fn service() -> AccountService {
    let hasher = Argon2Hasher::new(HashingConfig::minimal()).expect("minimal parameters are valid");
    AccountService::with_store(MemoryStore::new(), Arc::new(hasher))
}

/// The user every validation test starts from
pub fn example_user() -> UserAttributes {
    UserAttributes::new("Example User", "user@example.com", "foobar").with_password("foobar", "foobar")
}

/// Save a user named `name` with email `<name>@example.com`
pub async fn create_user(service: &AccountService, name: &str) -> User {
    service
        .save(UserAttributes::new(
            name,
            format!("{}@example.com", name.to_lowercase()),
            "password",
        ))
        .await
        .expect("fixture user should be valid")
}
