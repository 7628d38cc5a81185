use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::MembershipPasswordHasher;
use auth::PasswordFormat;
use chrono::Utc;
use membership_service::membership::errors::DirectoryError;
use membership_service::membership::models::CredentialRecord;
use membership_service::membership::models::DirectoryUser;
use membership_service::membership::models::UserId;
use membership_service::membership::ports::UserDirectory;

/// Lockout threshold applied by this fixture. The policy belongs to the
/// directory, not the service under test.
pub const MAX_FAILED_ATTEMPTS: i32 = 3;

pub const RESET_TOKEN_KEY: [u8; 32] = [101u8; 32];
pub const RESET_LINK_KEY: [u8; 32] = [102u8; 32];

struct Account {
    user: DirectoryUser,
    credentials: CredentialRecord,
}

/// In-memory membership directory standing in for the legacy store.
///
/// Implements the counter policy the real store would own: increments on
/// failure, resets on success, locks the account out at the threshold.
pub struct InMemoryDirectory {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Seed an approved (or not) account with a credential in the given format.
    pub fn add_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        format: PasswordFormat,
        approved: bool,
    ) -> UserId {
        let hasher = MembershipPasswordHasher::new();
        let salt = MembershipPasswordHasher::generate_salt();
        let digest = hasher
            .hash(password, format, &salt)
            .expect("Failed to hash seed password");

        self.insert(
            username,
            email,
            approved,
            Some(Utc::now()),
            CredentialRecord {
                password: digest,
                salt,
                format: format.code(),
                failed_password_attempts: 0,
                failed_answer_attempts: 0,
            },
        )
    }

    /// Seed an account that never had a password set (first-connection case).
    pub fn add_new_user(&self, username: &str, email: &str) -> UserId {
        self.insert(
            username,
            email,
            false,
            None,
            CredentialRecord {
                password: String::new(),
                salt: MembershipPasswordHasher::generate_salt(),
                format: PasswordFormat::HashedWithSalt.code(),
                failed_password_attempts: 0,
                failed_answer_attempts: 0,
            },
        )
    }

    /// Seed an account whose credential carries a format code this build
    /// does not recognize.
    pub fn add_user_with_format_code(&self, username: &str, email: &str, code: i32) -> UserId {
        self.insert(
            username,
            email,
            true,
            Some(Utc::now()),
            CredentialRecord {
                password: "opaque".to_string(),
                salt: MembershipPasswordHasher::generate_salt(),
                format: code,
                failed_password_attempts: 0,
                failed_answer_attempts: 0,
            },
        )
    }

    fn insert(
        &self,
        username: &str,
        email: &str,
        approved: bool,
        password_changed_at: Option<chrono::DateTime<Utc>>,
        credentials: CredentialRecord,
    ) -> UserId {
        let id = UserId::new();
        let user = DirectoryUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            is_locked_out: false,
            is_approved: approved,
            created_at: Utc::now(),
            last_activity_at: Utc::now(),
            password_changed_at,
        };
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            Account { user, credentials },
        );
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<DirectoryUser>, DirectoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|account| account.user.id == *id)
            .map(|account| account.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(username).map(|account| account.user.clone()))
    }

    async fn find_username_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|account| account.user.email == email)
            .map(|account| account.user.username.clone()))
    }

    async fn credential_record(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DirectoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .get(username)
            .map(|account| account.credentials.clone()))
    }

    async fn update_attempt_counters(
        &self,
        username: &str,
        _record: &CredentialRecord,
        password_correct: bool,
    ) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| DirectoryError::UpdateFailed(format!("no such user: {username}")))?;

        if password_correct {
            account.credentials.failed_password_attempts = 0;
            account.credentials.failed_answer_attempts = 0;
        } else {
            account.credentials.failed_password_attempts += 1;
            if account.credentials.failed_password_attempts >= MAX_FAILED_ATTEMPTS {
                account.user.is_locked_out = true;
            }
        }
        Ok(())
    }

    async fn update_password(
        &self,
        username: &str,
        password: &str,
        salt: &str,
        format: PasswordFormat,
    ) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| DirectoryError::UpdateFailed(format!("no such user: {username}")))?;

        account.credentials.password = password.to_string();
        account.credentials.salt = salt.to_string();
        account.credentials.format = format.code();
        account.user.password_changed_at = Some(Utc::now());
        Ok(())
    }
}
