use std::fmt;
use std::str::FromStr;

use auth::ProtectError;
use auth::TimeLimitedProtector;

use crate::membership::errors::ResetReasonError;
use crate::membership::models::MembershipUser;
use crate::membership::models::UserId;
use crate::membership::tokens::lifetime_from_days;

/// Purpose context for the sealed user-id link parameter, distinct from the
/// reset token's so the two wrappers can never open each other's output.
const RESET_LINK_USER_PURPOSE: &str = "membership/reset-link-user";

/// Why a password reset was requested.
///
/// The reason doubles as the purpose string embedded in reset tokens, which
/// is what prevents a first-connection token from authorizing a
/// forgotten-password reset and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPasswordReason {
    /// First password set for an account that never had one
    FirstConnection,
    /// Recovery for an account that forgot its password
    Forgotten,
}

impl ResetPasswordReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstConnection => "FirstConnection",
            Self::Forgotten => "Forgotten",
        }
    }

    /// Pick the applicable reason for a user.
    ///
    /// New users set their first password; everyone else is recovering one.
    pub fn for_user(user: &MembershipUser) -> Self {
        if user.is_new_user {
            Self::FirstConnection
        } else {
            Self::Forgotten
        }
    }
}

impl fmt::Display for ResetPasswordReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetPasswordReason {
    type Err = ResetReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("firstconnection") {
            Ok(Self::FirstConnection)
        } else if s.eq_ignore_ascii_case("forgotten") {
            Ok(Self::Forgotten)
        } else {
            Err(ResetReasonError::Unknown(s.to_string()))
        }
    }
}

/// The two query parameters carried by a reset link.
#[derive(Debug, Clone)]
pub struct ResetLinkParams {
    /// Sealed user id, URL-safe
    pub user: String,
    /// Reset token from the token protector, URL-safe
    pub code: String,
}

/// Seals and opens the user-id half of a reset link.
///
/// Owns its own independently-keyed protector; the reset token rides along
/// unchanged as the second parameter.
pub struct ResetLinkBuilder {
    user_protector: TimeLimitedProtector,
}

impl ResetLinkBuilder {
    /// Create a link builder from its own key.
    ///
    /// # Arguments
    /// * `key` - 256-bit key, independent of the reset-token key
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            user_protector: TimeLimitedProtector::new(key, RESET_LINK_USER_PURPOSE),
        }
    }

    /// Build the query parameters for a reset link.
    ///
    /// # Arguments
    /// * `user` - User the link is for
    /// * `token` - Reset token already issued for this user
    /// * `lifetime_days` - Validity window, matching the token's
    ///
    /// # Returns
    /// The `user` and `code` parameter values
    ///
    /// # Errors
    /// * `SealFailed` - Sealing the user id failed
    pub fn seal_params(
        &self,
        user: &MembershipUser,
        token: String,
        lifetime_days: f64,
    ) -> Result<ResetLinkParams, ProtectError> {
        let sealed = self
            .user_protector
            .protect(&user.id.to_string(), lifetime_from_days(lifetime_days)?)?;
        Ok(ResetLinkParams {
            user: sealed,
            code: token,
        })
    }

    /// Recover the user id from a link's `user` parameter.
    ///
    /// # Arguments
    /// * `sealed` - The `user` query parameter value
    ///
    /// # Returns
    /// The user id, or None for anything tampered, expired, or malformed;
    /// failures are swallowed
    pub fn open_user_id(&self, sealed: &str) -> Option<UserId> {
        let raw = self.user_protector.unprotect(sealed).ok()?;
        UserId::from_string(&raw).ok()
    }
}
