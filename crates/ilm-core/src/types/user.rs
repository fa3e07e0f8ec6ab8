//! # Users and Sessions
//!
//! Authentication identities for the directory's maintainers and the
//! refresh-token sessions issued to them. Same CRUD shape as the profile
//! records, without localization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::{merge, Patch};
use crate::validation::{validate_id, validate_one_of, validate_required, ValidationResult};

/// Roles a user may hold.
pub const USER_ROLES: [&str; 2] = ["admin", "manager"];

/// A maintainer account. `password_hash` is produced by the caller; this
/// layer never sees plain-text passwords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn validate_new(&self) -> ValidationResult<()> {
        validate_required("email", &self.email)?;
        validate_required("password_hash", &self.password_hash)?;
        validate_one_of("role", &self.role, &USER_ROLES)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub id: i64,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

impl Patch for UserPatch {
    type Target = User;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id)?;
        if let Some(email) = self.email.as_deref() {
            validate_required("email", email)?;
        }
        if let Some(hash) = self.password_hash.as_deref() {
            validate_required("password_hash", hash)?;
        }
        if let Some(role) = self.role.as_deref() {
            validate_one_of("role", role, &USER_ROLES)?;
        }
        Ok(())
    }

    fn merge_into(self, stored: &mut User) {
        merge(&mut stored.email, self.email);
        merge(&mut stored.password_hash, self.password_hash);
        merge(&mut stored.role, self.role);
    }
}

/// A refresh-token session. Sessions are created and revoked, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSession {
    pub fn validate_new(&self) -> ValidationResult<()> {
        validate_id("user_id", self.user_id)?;
        validate_required("refresh_token", &self.refresh_token)
    }

    /// Whether the session is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_validation() {
        let user = User {
            email: "admin@ilm.tj".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "admin".to_string(),
            ..Default::default()
        };
        assert!(user.validate_new().is_ok());

        let bad_role = User {
            role: "owner".to_string(),
            ..user.clone()
        };
        assert!(bad_role.validate_new().is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            email: "a@b.tj".to_string(),
            password_hash: "secret".to_string(),
            role: "manager".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = UserSession {
            user_id: 1,
            refresh_token: "t".to_string(),
            expires_at: now - Duration::seconds(1),
            ..Default::default()
        };
        assert!(session.is_expired(now));
        assert!(!UserSession {
            expires_at: now + Duration::hours(1),
            ..session
        }
        .is_expired(now));
    }
}
