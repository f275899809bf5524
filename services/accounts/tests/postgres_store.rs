//! Repository tests against a live PostgreSQL database
//!
//! Run with `DATABASE_URL` pointing at a disposable database:
//! `cargo test -p accounts --test postgres_store -- --ignored --test-threads=1`

use std::sync::Arc;

use accounts::models::{NewUser, Pagination, UserAttributes};
use accounts::password::{Argon2Hasher, HashingConfig};
use accounts::repositories::{MicropostRepository, RelationshipRepository, UserRepository};
use accounts::store::UserStore;
use accounts::{AccountError, AccountService, schema};
use common::database::{DatabaseConfig, init_pool};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> (PgPool, AccountService) {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    schema::migrate(&pool).await.expect("migrations");

    let hasher = Argon2Hasher::new(HashingConfig::minimal()).expect("hasher");
    let service = AccountService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(MicropostRepository::new(pool.clone())),
        Arc::new(RelationshipRepository::new(pool.clone())),
        Arc::new(hasher),
    );

    (pool, service)
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_unique_index_reports_storage_conflict() {
    let (pool, service) = setup().await;
    let email = unique_email("race");

    service
        .save(UserAttributes::new("Racer", email.clone(), "foobar"))
        .await
        .unwrap();

    // Skip validation to hit the index directly
    let repository = UserRepository::new(pool);
    let error = repository
        .insert(&NewUser {
            name: "Racer".to_string(),
            email: email.to_uppercase(),
            password_digest: "digest".to_string(),
        })
        .await
        .unwrap_err();

    assert!(error.is_unique_violation());
    assert!(matches!(
        AccountError::from(error),
        AccountError::StorageConflict(_)
    ));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_destroy_cascades_in_postgres() {
    let (_pool, service) = setup().await;

    let author = service
        .save(UserAttributes::new("Author", unique_email("author"), "foobar"))
        .await
        .unwrap();
    let reader = service
        .save(UserAttributes::new("Reader", unique_email("reader"), "foobar"))
        .await
        .unwrap();

    service.post(author.id, "first").await.unwrap();
    service.post(author.id, "second").await.unwrap();
    service.follow(reader.id, author.id).await.unwrap();

    let feed = service.feed(reader.id, Pagination::default()).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].content, "second");

    let before = service.micropost_count().await.unwrap();
    service.destroy(author.id).await.unwrap();

    assert_eq!(service.micropost_count().await.unwrap(), before - 2);
    assert!(service.following(reader.id).await.unwrap().is_empty());
    assert!(service.feed(reader.id, Pagination::default()).await.unwrap().is_empty());

    service.destroy(reader.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_emails_are_matched_case_insensitively() {
    let (_pool, service) = setup().await;
    let email = unique_email("case");

    let saved = service
        .save(UserAttributes::new("Case", email.to_uppercase(), "foobar"))
        .await
        .unwrap();
    assert_eq!(saved.email, email);

    let found = service
        .authenticate_by_email(&email.to_uppercase(), "foobar")
        .await
        .unwrap();
    assert_eq!(found.map(|user| user.id), Some(saved.id));

    service.destroy(saved.id).await.unwrap();
}
