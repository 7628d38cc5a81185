use thiserror::Error;

/// Error type for password operations.
///
/// Unknown format codes are not an error: `PasswordFormat::from_code`
/// returns `None` and callers fail the verification closed.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Salt is not valid base64: {0}")]
    InvalidSalt(String),
}
