use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::security::verify_password;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }
}

/// Lower-cases the domain part of an email address, leaving the local part
/// untouched. Input without an `@` is returned as-is.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_domain_only() {
        let samples = [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.com", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.com", "test4@example.com"),
        ];
        for (email, expected) in samples {
            assert_eq!(normalize_email(email), expected);
        }
    }

    #[test]
    fn normalize_email_without_at_is_unchanged() {
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
        assert_eq!(normalize_email(""), "");
    }

    #[test]
    fn normalize_email_splits_on_last_at() {
        assert_eq!(normalize_email("a@b@EXAMPLE.org"), "a@b@example.org");
    }

    #[test]
    fn new_user_is_active_regular_user() {
        let user = User::new("a@example.com".into(), String::new(), "hash".into());
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }
}
