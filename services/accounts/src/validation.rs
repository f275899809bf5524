//! Input validation utilities
//!
//! Checks never stop at the first failure: every violated field ends up in a
//! single [`ValidationErrors`] collection keyed by field name.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::models::UserAttributes;

pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 255;
pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const MICROPOST_MAX_LENGTH: usize = 140;

/// Field-keyed collection of validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has at least one message
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages recorded against `field`
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of the fields that failed, in sorted order
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    /// Messages prefixed with a human readable field name,
    /// e.g. "Email is invalid"
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                let label = humanize(field);
                messages
                    .iter()
                    .map(move |message| format!("{} {}", label, message))
            })
            .collect()
    }

    /// Move every message of `other` into `self`
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.trim_end_matches("_id").replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9_+\-.]+@[a-z0-9\-.]+\.[a-z]+$")
            .expect("Failed to compile email regex")
    })
}

/// Validate a display name
pub fn validate_name(name: &str, errors: &mut ValidationErrors) {
    if is_blank(name) {
        errors.add("name", "can't be blank");
    }

    if name.chars().count() > NAME_MAX_LENGTH {
        errors.add(
            "name",
            format!("is too long (maximum is {} characters)", NAME_MAX_LENGTH),
        );
    }
}

/// Validate the shape of an email address. Uniqueness needs the store and is
/// checked by the service.
pub fn validate_email(email: &str, errors: &mut ValidationErrors) {
    if is_blank(email) {
        errors.add("email", "can't be blank");
    }

    if email.chars().count() > EMAIL_MAX_LENGTH {
        errors.add(
            "email",
            format!("is too long (maximum is {} characters)", EMAIL_MAX_LENGTH),
        );
    }

    if !email_regex().is_match(email) {
        errors.add("email", "is invalid");
    }
}

/// Validate a plaintext password and its optional confirmation
pub fn validate_password(
    password: &str,
    confirmation: Option<&str>,
    errors: &mut ValidationErrors,
) {
    if is_blank(password) {
        errors.add("password", "can't be blank");
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.add(
            "password",
            format!(
                "is too short (minimum is {} characters)",
                PASSWORD_MIN_LENGTH
            ),
        );
    }

    if let Some(confirmation) = confirmation {
        if confirmation != password {
            errors.add("password_confirmation", "doesn't match Password");
        }
    }
}

/// Validate micropost content
pub fn validate_content(content: &str, errors: &mut ValidationErrors) {
    if is_blank(content) {
        errors.add("content", "can't be blank");
    }

    if content.chars().count() > MICROPOST_MAX_LENGTH {
        errors.add(
            "content",
            format!(
                "is too long (maximum is {} characters)",
                MICROPOST_MAX_LENGTH
            ),
        );
    }
}

impl UserAttributes {
    /// Run every check that does not need the store.
    ///
    /// The password is required for new records and checked for existing
    /// ones only when a new one was assigned.
    pub fn validate_fields(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        validate_name(&self.name, &mut errors);
        validate_email(&self.email, &mut errors);

        match self.password.as_deref() {
            Some(password) => validate_password(
                password,
                self.password_confirmation.as_deref(),
                &mut errors,
            ),
            None if self.is_new_record() => errors.add("password", "can't be blank"),
            None => {}
        }

        errors
    }
}
