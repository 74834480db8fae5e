//! User account entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{COMPANY_ID_PREFIX, MAX_COMPANY_ID_LENGTH};

static COMPANY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("company id pattern compiles"));

/// Issue a new opaque company identifier.
pub fn new_company_id() -> String {
    format!("{}{}", COMPANY_ID_PREFIX, Uuid::new_v4().simple())
}

/// Whether a value can be used as a company id in a URL path.
pub fn is_valid_company_id(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_COMPANY_ID_LENGTH && COMPANY_ID_PATTERN.is_match(value)
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// None for accounts created through Google sign-in
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Google subject identifier once the account is linked
    pub google_id: Option<String>,
    pub company_id: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified password account with a fresh company id
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash: Some(password_hash),
            google_id: None,
            company_id: new_company_id(),
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a verified account backed only by a Google identity
    pub fn from_google(email: String, name: String, google_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash: None,
            google_id: Some(google_id),
            company_id: new_company_id(),
            email_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_google_linked(&self) -> bool {
        self.google_id.is_some()
    }
}

/// Normalize an email for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "owner@acme.com")]
    pub email: String,
    #[schema(example = "Jane Owner")]
    pub name: String,
    /// Identifier scoping the account's chatbot and leads
    #[schema(example = "cmp_4f9c2a0e6b8d4c3e9a1f7b2d5e6c8a90")]
    pub company_id: String,
    pub email_verified: bool,
    pub google_linked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            google_linked: user.is_google_linked(),
            id: user.id,
            email: user.email,
            name: user.name,
            company_id: user.company_id,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_id_shape() {
        let id = new_company_id();
        assert!(id.starts_with("cmp_"));
        assert_eq!(id.len(), 4 + 32);
        assert!(is_valid_company_id(&id));
        assert_ne!(id, new_company_id());
    }

    #[test]
    fn test_company_id_validation() {
        assert!(is_valid_company_id("acme-widget_01"));
        assert!(!is_valid_company_id(""));
        assert!(!is_valid_company_id("../etc/passwd"));
        assert!(!is_valid_company_id("has space"));
        assert!(!is_valid_company_id(&"a".repeat(65)));
    }

    #[test]
    fn test_new_user_is_unverified() {
        let user = User::new("a@b.com".into(), "A".into(), "hash".into());
        assert!(!user.email_verified);
        assert!(user.has_password());
        assert!(!user.is_google_linked());
    }

    #[test]
    fn test_google_user_is_verified_without_password() {
        let user = User::from_google("a@b.com".into(), "A".into(), "10769150350006150715113082367".into());
        assert!(user.email_verified);
        assert!(!user.has_password());
        assert!(UserResponse::from(user).google_linked);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("a@b.com".into(), "A".into(), "secret-hash".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Owner@Acme.COM "), "owner@acme.com");
    }
}
