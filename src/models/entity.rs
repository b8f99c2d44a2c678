//! The contract every stored collection item satisfies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::Collections;
use crate::errors::AppError;

/// A record kept in one of the store's collections.
///
/// `Create` is the add-form payload, `Update` the edit-form payload where
/// every field is optional.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Local storage key and URL segment, e.g. `courses`.
    const COLLECTION: &'static str;
    /// Human readable name used in messages, e.g. `Course`.
    const LABEL: &'static str;

    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    fn id(&self) -> &str;
    fn version(&self) -> i64;

    /// Check required fields of an add-form payload.
    fn validate(request: &Self::Create) -> Result<(), AppError>;

    /// Build a fresh record from an already validated payload.
    fn create(id: String, now: String, request: Self::Create) -> Self;

    fn expected_version(request: &Self::Update) -> Option<i64>;

    /// Merge an edit-form payload into this record.
    ///
    /// Errors when the patch blanks a required field; callers apply patches
    /// to a copy so a failed merge leaves the stored record untouched.
    fn apply(&mut self, request: Self::Update) -> Result<(), AppError>;

    /// Record a successful modification.
    fn stamp(&mut self, updated_at: String, version: i64);

    fn collection(collections: &Collections) -> &Vec<Self>;
    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

/// Generate a timestamp-based, unique identifier (UUIDv7).
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Fail with a validation error when `value` is blank.
pub fn require(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", label)));
    }
    Ok(())
}

/// Like [`require`], for a field an edit payload may leave out.
pub fn require_if_present(label: &str, value: Option<&String>) -> Result<(), AppError> {
    match value {
        Some(v) => require(label, v),
        None => Ok(()),
    }
}

pub fn non_negative(label: &str, value: Option<f64>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::Validation(format!(
            "{} must be a non-negative number",
            label
        ))),
        _ => Ok(()),
    }
}

/// Minimal shape check, the rest is the mail server's business.
pub fn email(label: &str, value: &str) -> Result<(), AppError> {
    require(label, value)?;
    let valid = value
        .trim()
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation(format!(
            "{} must be a valid email address",
            label
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_v7_and_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 7);
    }

    #[test]
    fn test_require() {
        assert!(require("Title", "Rust 101").is_ok());
        let err = require("Title", "   ").unwrap_err();
        assert_eq!(err.message(), "Title is required");
        assert!(require_if_present("Title", None).is_ok());
        assert!(require_if_present("Title", Some(&String::new())).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("Price", None).is_ok());
        assert!(non_negative("Price", Some(0.0)).is_ok());
        assert!(non_negative("Price", Some(-1.0)).is_err());
        assert!(non_negative("Price", Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("Email", "ada@example.com").is_ok());
        assert!(email("Email", "ada@localhost").is_err());
        assert!(email("Email", "@example.com").is_err());
        assert!(email("Email", "").is_err());
    }
}
