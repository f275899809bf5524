//! Validation and persistence of user records

mod support;

use accounts::AccountError;
use accounts::models::{User, UserAttributes};
use chrono::Utc;
use support::{create_user, example_user, service};
use uuid::Uuid;

fn field_errors(result: Result<(), AccountError>) -> Vec<&'static str> {
    match result {
        Err(AccountError::Validation(errors)) => errors.fields().collect(),
        Err(other) => panic!("expected validation errors, got {other}"),
        Ok(()) => Vec::new(),
    }
}

#[tokio::test]
async fn test_should_be_valid() {
    let service = service();
    assert!(service.validate(&example_user()).await.is_ok());
}

#[tokio::test]
async fn test_name_should_be_present() {
    let service = service();
    let mut user = example_user();
    user.name = "  ".to_string();
    assert_eq!(field_errors(service.validate(&user).await), ["name"]);
}

#[tokio::test]
async fn test_email_should_be_present() {
    let service = service();
    let mut user = example_user();
    user.email = "  ".to_string();
    assert_eq!(field_errors(service.validate(&user).await), ["email"]);
}

#[tokio::test]
async fn test_name_should_not_be_too_long() {
    let service = service();
    let mut user = example_user();
    user.name = "a".repeat(51);
    assert_eq!(field_errors(service.validate(&user).await), ["name"]);
}

#[tokio::test]
async fn test_email_should_not_be_too_long() {
    let service = service();
    let mut user = example_user();
    user.email = format!("{}@example.com", "a".repeat(244));
    assert_eq!(field_errors(service.validate(&user).await), ["email"]);
}

#[tokio::test]
async fn test_email_validation_should_accept_valid_addresses() {
    let service = service();
    for address in [
        "user@example.com",
        "USER@foo.COM",
        "A_US-ER@foo.bar.org",
        "first.last@foo.jp",
        "alice+bob@baz.cn",
    ] {
        let mut user = example_user();
        user.email = address.to_string();
        assert!(
            service.validate(&user).await.is_ok(),
            "{address:?} should be valid"
        );
    }
}

#[tokio::test]
async fn test_email_validation_should_reject_invalid_addresses() {
    let service = service();
    for address in [
        "user@example,com",
        "user_at_foo.org",
        "user.name@example.",
        "foo@bar_baz.com",
        "foo@bar+baz.com",
    ] {
        let mut user = example_user();
        user.email = address.to_string();
        assert_eq!(
            field_errors(service.validate(&user).await),
            ["email"],
            "{address:?} should be invalid"
        );
    }
}

#[tokio::test]
async fn test_email_addresses_should_be_unique() {
    let service = service();
    let user = example_user();
    let mut duplicate_user = user.clone();
    duplicate_user.email = user.email.to_uppercase();

    service.save(user).await.unwrap();

    let errors = match service.validate(&duplicate_user).await {
        Err(AccountError::Validation(errors)) => errors,
        other => panic!("expected a uniqueness failure, got {other:?}"),
    };
    assert_eq!(errors.get("email"), ["has already been taken".to_string()]);
}

#[tokio::test]
async fn test_email_addresses_should_be_saved_as_lowercase() {
    let service = service();
    let mut user = example_user();
    user.email = "Foo@ExAMPle.CoM".to_string();

    let saved = service.save(user).await.unwrap();
    assert_eq!(saved.email, "foo@example.com");

    let reloaded = service.find(saved.id).await.unwrap().unwrap();
    assert_eq!(reloaded.email, "foo@example.com");
}

#[tokio::test]
async fn test_password_should_be_present() {
    let service = service();
    let user = example_user().with_password(" ".repeat(6), " ".repeat(6));
    assert_eq!(field_errors(service.validate(&user).await), ["password"]);

    let user = example_user().with_password("", "");
    assert!(field_errors(service.validate(&user).await).contains(&"password"));
}

#[tokio::test]
async fn test_password_should_have_a_minimum_length() {
    let service = service();
    let user = example_user().with_password("a".repeat(5), "a".repeat(5));
    assert_eq!(field_errors(service.validate(&user).await), ["password"]);

    let user = example_user().with_password("a".repeat(6), "a".repeat(6));
    assert!(service.validate(&user).await.is_ok());
}

#[tokio::test]
async fn test_invalid_user_is_not_saved() {
    let service = service();
    let mut user = example_user();
    user.name = String::new();
    user.email = "invalid".to_string();

    let result = service.save(user).await;
    let errors = result.unwrap_err();
    let fields: Vec<_> = errors.validation_errors().unwrap().fields().collect();
    assert_eq!(fields, ["email", "name"]);
    assert_eq!(service.user_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_password_is_stored_as_digest() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let digest = saved.password_digest.as_deref().unwrap();
    assert_ne!(digest, "foobar");
    assert!(service.authenticate(&saved, "foobar"));
    assert!(!service.authenticate(&saved, "foobaz"));
}

#[tokio::test]
async fn test_authenticate_should_return_false_for_a_user_with_nil_digest() {
    let service = service();
    let user = User {
        id: Uuid::new_v4(),
        name: "Example User".to_string(),
        email: "user@example.com".to_string(),
        password_digest: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert!(!service.authenticate(&user, ""));
}

#[tokio::test]
async fn test_authenticate_by_email_ignores_case() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let found = service
        .authenticate_by_email("USER@Example.com", "foobar")
        .await
        .unwrap();
    assert_eq!(found.map(|user| user.id), Some(saved.id));

    assert!(service
        .authenticate_by_email("user@example.com", "wrong!")
        .await
        .unwrap()
        .is_none());
    assert!(service
        .authenticate_by_email("nobody@example.com", "foobar")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_update_without_password_keeps_digest() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let mut edit = UserAttributes::from_user(&saved);
    edit.name = "Renamed User".to_string();
    let updated = service.save(edit).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.name, "Renamed User");
    assert_eq!(updated.password_digest, saved.password_digest);
    assert!(service.authenticate(&updated, "foobar"));
}

#[tokio::test]
async fn test_update_with_new_password() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let edit = UserAttributes::from_user(&saved).with_password("secret1", "secret1");
    let updated = service.save(edit).await.unwrap();

    assert!(service.authenticate(&updated, "secret1"));
    assert!(!service.authenticate(&updated, "foobar"));
}

#[tokio::test]
async fn test_update_rejects_short_password() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let edit = UserAttributes::from_user(&saved).with_password("abc", "abc");
    assert_eq!(field_errors(service.save(edit).await.map(|_| ())), ["password"]);
}

#[tokio::test]
async fn test_update_keeping_own_email_is_valid() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();

    let mut edit = UserAttributes::from_user(&saved);
    edit.email = "USER@example.com".to_string();
    let updated = service.save(edit).await.unwrap();
    assert_eq!(updated.email, "user@example.com");
}

#[tokio::test]
async fn test_update_to_taken_email_fails() {
    let service = service();
    let alice = create_user(&service, "Alice").await;
    create_user(&service, "Bob").await;

    let mut edit = UserAttributes::from_user(&alice);
    edit.email = "BOB@example.com".to_string();
    assert_eq!(field_errors(service.save(edit).await.map(|_| ())), ["email"]);
}

#[tokio::test]
async fn test_update_of_destroyed_user_is_not_found() {
    let service = service();
    let saved = service.save(example_user()).await.unwrap();
    service.destroy(saved.id).await.unwrap();

    let result = service.save(UserAttributes::from_user(&saved)).await;
    assert!(matches!(result, Err(AccountError::UserNotFound(id)) if id == saved.id));
}

#[tokio::test]
async fn test_mismatched_confirmation_is_rejected() {
    let service = service();
    let user = example_user().with_password("foobar", "foobaz");
    assert_eq!(
        field_errors(service.validate(&user).await),
        ["password_confirmation"]
    );
}

#[tokio::test]
async fn test_racing_signups_keep_one_record() {
    let service = service();

    let (first, second) = tokio::join!(service.save(example_user()), service.save(example_user()));

    let outcomes = [first, second];
    let saved = outcomes.iter().filter(|result| result.is_ok()).count();
    assert_eq!(saved, 1);
    assert!(outcomes.iter().any(|result| matches!(
        result,
        Err(AccountError::StorageConflict(_)) | Err(AccountError::Validation(_))
    )));
    assert_eq!(service.user_count().await.unwrap(), 1);
}
