use async_trait::async_trait;
use auth::PasswordFormat;

use crate::domain::membership::models::CredentialRecord;
use crate::domain::membership::models::DirectoryUser;
use crate::domain::membership::models::MembershipUser;
use crate::domain::membership::models::UserId;
use crate::membership::errors::DirectoryError;
use crate::membership::errors::MembershipError;

/// Consumed contract over the legacy membership store.
///
/// Any backing store satisfying these operations can sit behind the service.
/// Absence of a row is `Ok(None)`, never an error; errors are reserved for
/// infrastructure failures. The directory, not the service, owns atomicity
/// of its persisted counters and the lockout policy applied to them.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve a user row by identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// Optional user row (None if not found)
    ///
    /// # Errors
    /// * `QueryFailed` - Store operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Retrieve a user row by username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// Optional user row (None if not found)
    ///
    /// # Errors
    /// * `QueryFailed` - Store operation failed
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Resolve an email address to the owning username.
    ///
    /// # Arguments
    /// * `email` - Email address string
    ///
    /// # Returns
    /// Optional username (None if no user owns this email)
    ///
    /// # Errors
    /// * `QueryFailed` - Store operation failed
    async fn find_username_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DirectoryError>;

    /// Retrieve the credential record for a username.
    ///
    /// # Arguments
    /// * `username` - Username the credentials belong to
    ///
    /// # Returns
    /// Optional credential record (None if not found)
    ///
    /// # Errors
    /// * `QueryFailed` - Store operation failed
    async fn credential_record(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DirectoryError>;

    /// Persist the outcome of a credential check.
    ///
    /// On success the directory resets both failed-attempt counters; on
    /// failure it applies its own increment and lockout policy. The service
    /// only signals which of the two happened.
    ///
    /// # Arguments
    /// * `username` - Username the credentials belong to
    /// * `record` - Credential record the check ran against
    /// * `password_correct` - Whether the digest comparison succeeded
    ///
    /// # Errors
    /// * `UpdateFailed` - Store operation failed
    async fn update_attempt_counters(
        &self,
        username: &str,
        record: &CredentialRecord,
        password_correct: bool,
    ) -> Result<(), DirectoryError>;

    /// Persist a new credential for a username.
    ///
    /// # Arguments
    /// * `username` - Username the credentials belong to
    /// * `password` - Digest to store
    /// * `salt` - Base64-encoded salt the digest was computed with
    /// * `format` - Storage format of the new credential
    ///
    /// # Errors
    /// * `UpdateFailed` - Store operation failed
    async fn update_password(
        &self,
        username: &str,
        password: &str,
        salt: &str,
        format: PasswordFormat,
    ) -> Result<(), DirectoryError>;
}

/// Port for the membership service offered to the identity server.
#[async_trait]
pub trait MembershipServicePort: Send + Sync + 'static {
    /// Retrieve a user projection by unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// Optional user projection (None if not found)
    ///
    /// # Errors
    /// * `Directory` - Store operation failed
    async fn get_user(&self, id: &UserId) -> Result<Option<MembershipUser>, MembershipError>;

    /// Retrieve a user projection by username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// Optional user projection (None if not found)
    ///
    /// # Errors
    /// * `Directory` - Store operation failed
    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<MembershipUser>, MembershipError>;

    /// Resolve an email address to the owning username.
    ///
    /// None is a legitimate business result for an unregistered email,
    /// distinct from an infrastructure failure.
    ///
    /// # Arguments
    /// * `email` - Email address string
    ///
    /// # Returns
    /// Optional username (None if no user owns this email)
    ///
    /// # Errors
    /// * `Directory` - Store operation failed
    async fn get_username_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, MembershipError>;

    /// Check that an email identifies an approved user.
    ///
    /// # Arguments
    /// * `email` - Email address string
    ///
    /// # Returns
    /// True if a user owns this email and is approved, false otherwise
    ///
    /// # Errors
    /// * `Directory` - Store operation failed
    async fn validate_email(&self, email: &str) -> Result<bool, MembershipError>;

    /// Validate a username/password pair against the directory.
    ///
    /// Wrong password, locked-out, and unapproved accounts all surface as a
    /// uniform false; no reason is distinguishable from the outside.
    ///
    /// # Arguments
    /// * `username` - Username to validate
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// True if the password matches and the account is approved
    ///
    /// # Errors
    /// * `Directory` - Store operation failed
    async fn validate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, MembershipError>;

    /// Set a new password for a username.
    ///
    /// Always writes the modern salted-hash format with a fresh random salt.
    ///
    /// # Arguments
    /// * `username` - Username the credentials belong to
    /// * `password` - New plaintext password
    ///
    /// # Errors
    /// * `Directory` - Persistence failed; the effect is unconfirmed and the
    ///   failure is never swallowed
    async fn update_password(&self, username: &str, password: &str)
        -> Result<(), MembershipError>;

    /// Issue a time-bounded password-reset token for a user.
    ///
    /// # Arguments
    /// * `user` - User the token is issued for
    /// * `purpose` - Intent string preventing cross-purpose replay
    /// * `lifetime_days` - Validity window in days
    ///
    /// # Returns
    /// Opaque, URL-safe token string
    ///
    /// # Errors
    /// * `Token` - Sealing failed
    async fn issue_reset_token(
        &self,
        user: &MembershipUser,
        purpose: &str,
        lifetime_days: f64,
    ) -> Result<String, MembershipError>;

    /// Validate a password-reset token for a user.
    ///
    /// Tampered, expired, malformed, and mismatched tokens all return false;
    /// this never errors and never leaks why validation failed.
    ///
    /// # Arguments
    /// * `user` - User presenting the token
    /// * `token` - Opaque token string
    /// * `purpose` - Expected intent string
    ///
    /// # Returns
    /// True only if the token is authentic, unexpired, and bound to this
    /// user and purpose
    async fn validate_reset_token(
        &self,
        user: &MembershipUser,
        token: &str,
        purpose: &str,
    ) -> bool;
}
