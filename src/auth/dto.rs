use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validation::{Checker, FieldError};

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 25;

/// Body of `POST /register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Checked credentials: username trimmed, password untouched.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

pub fn validate_registration<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<Credentials<'a>, Vec<FieldError>> {
    let mut c = Checker::new();
    let username = c.required("username", username);
    if !c.has("username") {
        let len = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            c.push(
                "username",
                format!("Field must be between {USERNAME_MIN} and {USERNAME_MAX} characters long."),
            );
        }
    }
    if password.is_empty() {
        c.push("password", "This field is required.");
    }
    c.finish(|| Credentials { username, password })
}

pub fn validate_login<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<Credentials<'a>, Vec<FieldError>> {
    let mut c = Checker::new();
    let username = c.required("username", username);
    if password.is_empty() {
        c.push("password", "This field is required.");
    }
    c.finish(|| Credentials { username, password })
}

/// An authenticated session as carried through a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_accepts_trimmed_username() {
        let creds = validate_registration("  alice ", "pw1234").unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw1234");
    }

    #[test]
    fn registration_enforces_username_length() {
        let errs = validate_registration("abc", "pw").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "username");

        let long = "x".repeat(USERNAME_MAX + 1);
        assert!(validate_registration(&long, "pw").is_err());
        assert!(validate_registration(&"x".repeat(USERNAME_MAX), "pw").is_ok());
    }

    #[test]
    fn registration_requires_both_fields() {
        let errs = validate_registration("", "").unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["username", "password"]);
    }

    #[test]
    fn login_has_no_length_rule() {
        assert!(validate_login("bo", "x").is_ok());
        assert!(validate_login("bob", "").is_err());
    }
}
