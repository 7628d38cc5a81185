use std::sync::Arc;

use async_trait::async_trait;
use auth::MembershipPasswordHasher;
use auth::PasswordFormat;

use crate::domain::membership::models::MembershipUser;
use crate::domain::membership::models::UserId;
use crate::domain::membership::ports::MembershipServicePort;
use crate::domain::membership::ports::UserDirectory;
use crate::membership::errors::MembershipError;
use crate::membership::tokens::ResetTokenProtector;

/// Domain service adapting the legacy membership directory for an identity
/// server.
///
/// Stateless composition of the directory port, the legacy password hasher,
/// and the reset-token protector: every operation is a function of its
/// inputs, the directory's current state, and wall-clock time. Failed
/// attempt counters live in the directory; the service only signals whether
/// a check succeeded.
pub struct MembershipService<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    password_hasher: MembershipPasswordHasher,
    reset_tokens: ResetTokenProtector,
}

impl<D> MembershipService<D>
where
    D: UserDirectory,
{
    /// Create a new membership service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - Membership directory implementation
    /// * `reset_token_key` - Key owned by this instance's reset-token
    ///   protector
    ///
    /// # Returns
    /// Configured membership service instance
    pub fn new(directory: Arc<D>, reset_token_key: &[u8; 32]) -> Self {
        Self {
            directory,
            password_hasher: MembershipPasswordHasher::new(),
            reset_tokens: ResetTokenProtector::new(reset_token_key),
        }
    }
}

#[async_trait]
impl<D> MembershipServicePort for MembershipService<D>
where
    D: UserDirectory,
{
    async fn get_user(&self, id: &UserId) -> Result<Option<MembershipUser>, MembershipError> {
        let user = self.directory.find_by_id(id).await?;
        Ok(user.map(MembershipUser::from))
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<MembershipUser>, MembershipError> {
        let user = self.directory.find_by_username(username).await?;
        Ok(user.map(MembershipUser::from))
    }

    async fn get_username_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, MembershipError> {
        Ok(self.directory.find_username_by_email(email).await?)
    }

    async fn validate_email(&self, email: &str) -> Result<bool, MembershipError> {
        let Some(username) = self.directory.find_username_by_email(email).await? else {
            return Ok(false);
        };
        let user = self.directory.find_by_username(&username).await?;
        Ok(user.is_some_and(|u| u.is_approved))
    }

    async fn validate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, MembershipError> {
        let Some(record) = self.directory.credential_record(username).await? else {
            return Ok(false);
        };

        // Unknown format codes and undecodable salts fail closed as a mismatch
        let password_correct = match PasswordFormat::from_code(record.format) {
            Some(format) => self
                .password_hasher
                .verify(password, format, &record.salt, &record.password)
                .unwrap_or(false),
            None => {
                tracing::warn!(
                    code = record.format,
                    "Credential record carries an unrecognized format code"
                );
                false
            }
        };

        if !password_correct
            || record.failed_password_attempts != 0
            || record.failed_answer_attempts != 0
        {
            self.directory
                .update_attempt_counters(username, &record, password_correct)
                .await?;
        }

        // Re-fetch to observe any lockout the counter update just produced
        let user = self.directory.find_by_username(username).await?;

        Ok(password_correct && user.is_some_and(|u| u.is_approved && !u.is_locked_out))
    }

    async fn update_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), MembershipError> {
        let salt = MembershipPasswordHasher::generate_salt();
        let digest = self
            .password_hasher
            .hash(password, PasswordFormat::HashedWithSalt, &salt)?;

        self.directory
            .update_password(username, &digest, &salt, PasswordFormat::HashedWithSalt)
            .await?;

        tracing::info!(username, "Password updated");
        Ok(())
    }

    async fn issue_reset_token(
        &self,
        user: &MembershipUser,
        purpose: &str,
        lifetime_days: f64,
    ) -> Result<String, MembershipError> {
        let token = self.reset_tokens.issue(user, purpose, lifetime_days)?;
        tracing::debug!(user_id = %user.id, purpose, "Reset token issued");
        Ok(token)
    }

    async fn validate_reset_token(
        &self,
        user: &MembershipUser,
        token: &str,
        purpose: &str,
    ) -> bool {
        self.reset_tokens.validate(user, token, purpose)
    }
}
