use auth::PasswordError;
use auth::ProtectError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for reset-reason parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResetReasonError {
    #[error("Unknown reset reason: {0}")]
    Unknown(String),
}

/// Infrastructure failures reported by the membership directory.
///
/// Absence of a user, username, or credential record is not an error; the
/// directory reports it as `Ok(None)`.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Directory query failed: {0}")]
    QueryFailed(String),

    #[error("Directory update failed: {0}")]
    UpdateFailed(String),
}

/// Top-level error for all membership operations
#[derive(Debug, Clone, Error)]
pub enum MembershipError {
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] ProtectError),

    // Infrastructure errors
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}
