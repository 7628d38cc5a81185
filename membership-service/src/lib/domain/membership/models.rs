use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::membership::errors::UserIdError;

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated lowercase: the fixed textual form embedded in tokens
        self.0.fmt(f)
    }
}

/// Raw user row as returned by the membership directory.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_locked_out: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub password_changed_at: Option<DateTime<Utc>>,
}

/// Read-only user projection handed to the surrounding identity server.
///
/// Built from a [`DirectoryUser`]; the service never mutates one.
#[derive(Debug, Clone)]
pub struct MembershipUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_locked_out: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Derived: unapproved and never had a password set
    pub is_new_user: bool,
}

impl From<DirectoryUser> for MembershipUser {
    fn from(user: DirectoryUser) -> Self {
        let is_new_user = !user.is_approved && user.password_changed_at.is_none();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_locked_out: user.is_locked_out,
            is_approved: user.is_approved,
            created_at: user.created_at,
            last_activity_at: user.last_activity_at,
            password_changed_at: user.password_changed_at,
            is_new_user,
        }
    }
}

/// Credential row owned by the membership directory.
///
/// The service reads it, compares digests, and signals counter updates back
/// through the directory; it never persists one itself. `format` stays the
/// raw stored code so records written with a tag this build does not know
/// can still be represented (and fail verification closed).
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Stored digest, or the plaintext itself for clear-format records
    pub password: String,
    pub salt: String,
    pub format: i32,
    pub failed_password_attempts: i32,
    pub failed_answer_attempts: i32,
}
