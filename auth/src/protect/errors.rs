use thiserror::Error;

/// Error type for token protection operations.
#[derive(Debug, Clone, Error)]
pub enum ProtectError {
    #[error("Failed to seal token: {0}")]
    SealFailed(String),

    #[error("Failed to open token: {0}")]
    OpenFailed(String),

    #[error("Token is expired")]
    Expired,
}
