use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;
use crate::domain::{Role, Stars};
use crate::services::FieldError;

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Collects field-level failures so a request reports every bad field at
/// once instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result`'s error against `field` and returns its value.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(FieldError::new(field, message));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(self.errors))
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if !(20..=60).contains(&char_len(name)) {
        return Err("Name must be 20-60 characters".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

    if email.len() > 254 || !re.is_match(email) {
        return Err("Valid email required".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if !(8..=16).contains(&char_len(password)) {
        return Err("Password must be 8-16 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(())
}

pub fn validate_address(address: &str) -> Result<(), String> {
    if address.trim().is_empty() || char_len(address) > 400 {
        return Err("Address required, max 400 characters".to_string());
    }
    Ok(())
}

pub fn validate_store_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() || char_len(name) > 100 {
        return Err("Store name is required (max 100 characters)".to_string());
    }
    Ok(())
}

pub fn validate_rating(value: i64) -> Result<Stars, String> {
    Stars::new(value).ok_or_else(|| "Rating must be a number between 1 and 5".to_string())
}

pub fn validate_role(role: &str) -> Result<Role, String> {
    role.parse::<Role>()
        .map_err(|_| "Role must be one of: admin, user, store_owner".to_string())
}

pub fn validate_required(value: &str, message: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alexandra Montgomery").is_ok());
        assert!(validate_name(&"a".repeat(60)).is_ok());
        assert!(validate_name("Short Name").is_err());
        assert!(validate_name(&"a".repeat(61)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("spa ce@example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Secret!23").is_ok());
        assert!(validate_password("Ab{}defgh").is_ok());
        assert!(validate_password("S!1").is_err());
        assert!(validate_password("Secret!234567890X").is_err());
        assert!(validate_password("secret!23").is_err());
        assert!(validate_password("Secret123").is_err());
    }

    #[test]
    fn test_validate_address_and_store_name() {
        assert!(validate_address("1 Main Street").is_ok());
        assert!(validate_address("").is_err());
        assert!(validate_address(&"x".repeat(401)).is_err());

        assert!(validate_store_name("Corner Cafe").is_ok());
        assert!(validate_store_name("   ").is_err());
        assert!(validate_store_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_rating_and_role() {
        assert_eq!(validate_rating(5).map(|s| s.value()), Ok(5));
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());

        assert_eq!(validate_role("store_owner"), Ok(Role::StoreOwner));
        assert!(validate_role("owner").is_err());
    }

    #[test]
    fn test_validator_collects_every_failure() {
        let mut v = Validator::new();
        v.check("name", validate_name("short"));
        v.check("email", validate_email("nope"));
        let stars = v.check("rating", validate_rating(3));
        assert!(stars.is_some());

        match v.finish() {
            Err(ApiError::ValidationError(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "email"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
