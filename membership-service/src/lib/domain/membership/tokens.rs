use auth::ProtectError;
use auth::TimeLimitedProtector;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::membership::models::MembershipUser;

/// Purpose context isolating reset tokens from every other token type.
const RESET_TOKEN_PURPOSE: &str = "membership/reset-token";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert a day count into a duration for the protector.
pub(crate) fn lifetime_from_days(days: f64) -> Result<Duration, ProtectError> {
    if !days.is_finite() {
        return Err(ProtectError::SealFailed("lifetime out of range".to_string()));
    }
    Ok(Duration::milliseconds((days * MILLIS_PER_DAY) as i64))
}

/// Issues and validates password-reset tokens.
///
/// The token is an opaque authenticated-encrypted string around the
/// canonical payload `purpose|subject_id|issued_at|lifetime_days`. The
/// protector enforces the expiry boundary itself; validation re-derives it
/// from the payload anyway as defense in depth.
///
/// Tokens are never persisted and carry no single-use tracking: a still
/// valid token may be replayed within its window.
pub struct ResetTokenProtector {
    protector: TimeLimitedProtector,
}

impl ResetTokenProtector {
    /// Create a reset-token protector from its own key.
    ///
    /// # Arguments
    /// * `key` - 256-bit key, independent of every other protector key
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            protector: TimeLimitedProtector::new(key, RESET_TOKEN_PURPOSE),
        }
    }

    /// Issue a reset token for a user.
    ///
    /// # Arguments
    /// * `user` - User the token is issued for
    /// * `purpose` - Intent string (e.g. first connection vs. forgotten)
    /// * `lifetime_days` - Validity window in days
    ///
    /// # Returns
    /// Opaque, URL-safe token string
    ///
    /// # Errors
    /// * `SealFailed` - Encryption failed or the lifetime is out of range
    pub fn issue(
        &self,
        user: &MembershipUser,
        purpose: &str,
        lifetime_days: f64,
    ) -> Result<String, ProtectError> {
        let payload = format!(
            "{}|{}|{}|{}",
            purpose,
            user.id,
            Utc::now().to_rfc3339(),
            lifetime_days
        );
        self.protector
            .protect(&payload, lifetime_from_days(lifetime_days)?)
    }

    /// Validate a reset token for a user.
    ///
    /// Any failure along the way (tamper, expiry, malformed payload, wrong
    /// subject, wrong purpose) surfaces as a plain false. Underlying errors
    /// are swallowed so callers cannot probe the cryptographic layer.
    ///
    /// # Arguments
    /// * `user` - User presenting the token
    /// * `token` - Opaque token string
    /// * `expected_purpose` - Intent string the token must have been issued
    ///   with
    ///
    /// # Returns
    /// True only if every check passes
    pub fn validate(&self, user: &MembershipUser, token: &str, expected_purpose: &str) -> bool {
        let Ok(payload) = self.protector.unprotect(token) else {
            return false;
        };

        let fields: Vec<&str> = payload.split('|').collect();
        if fields.len() != 4 {
            return false;
        }

        let Ok(issued_at) = DateTime::parse_from_rfc3339(fields[2]) else {
            return false;
        };
        let Ok(days) = fields[3].parse::<f64>() else {
            return false;
        };
        let Ok(lifespan) = lifetime_from_days(days) else {
            return false;
        };

        // Redundant with the protector's own boundary; kept as defense in depth
        let Some(expires_at) = issued_at.checked_add_signed(lifespan) else {
            return false;
        };
        if expires_at.with_timezone(&Utc) < Utc::now() {
            return false;
        }

        // Bound to subject and purpose: no cross-account or cross-purpose use
        if fields[1] != user.id.to_string() {
            return false;
        }
        fields[0] == expected_purpose
    }
}
