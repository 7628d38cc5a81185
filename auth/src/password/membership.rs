use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Digest;
use sha1::Sha1;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Salt size used for newly written credentials (16 bytes, base64-encoded).
const SALT_BYTES: usize = 16;

/// Storage format of a membership credential.
///
/// The numeric codes are part of the store contract and must not change:
/// existing rows carry them, and the directory persists them verbatim.
/// New credentials are always written as `HashedWithSalt`; the other formats
/// remain readable for verification of previously written records only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordFormat {
    /// Plaintext storage (code 0).
    Clear,
    /// Unsalted SHA-1 digest, base64-encoded (code 1).
    Hashed,
    /// SHA-1 digest over salt bytes followed by password bytes (code 2).
    HashedWithSalt,
}

impl PasswordFormat {
    /// Resolve a stored format code.
    ///
    /// # Arguments
    /// * `code` - Numeric format tag from the credential record
    ///
    /// # Returns
    /// The matching format, or None for anything outside the closed set.
    /// Callers treat None as a failed verification, never as a default.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Clear),
            1 => Some(Self::Hashed),
            2 => Some(Self::HashedWithSalt),
            _ => None,
        }
    }

    /// Numeric code persisted by the directory.
    pub fn code(self) -> i32 {
        match self {
            Self::Clear => 0,
            Self::Hashed => 1,
            Self::HashedWithSalt => 2,
        }
    }
}

/// Password hasher for legacy membership credential formats.
///
/// Computes the digest the legacy store holds for a given format tag and
/// salt. Deterministic for identical inputs, which is what makes stored
/// credentials verifiable at all.
pub struct MembershipPasswordHasher;

impl MembershipPasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Compute the stored digest for a plaintext password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    /// * `format` - Storage format of the credential
    /// * `salt` - Base64-encoded salt from the credential record (ignored by
    ///   the saltless formats)
    ///
    /// # Returns
    /// The digest as held by the store: the plaintext itself for `Clear`,
    /// otherwise a base64-encoded SHA-1 digest
    ///
    /// # Errors
    /// * `InvalidSalt` - Salt is not valid base64 (salted format only)
    pub fn hash(
        &self,
        password: &str,
        format: PasswordFormat,
        salt: &str,
    ) -> Result<String, PasswordError> {
        match format {
            PasswordFormat::Clear => Ok(password.to_string()),
            PasswordFormat::Hashed => {
                let mut hasher = Sha1::new();
                hasher.update(password.as_bytes());
                Ok(STANDARD.encode(hasher.finalize()))
            }
            PasswordFormat::HashedWithSalt => {
                let salt_bytes = STANDARD
                    .decode(salt)
                    .map_err(|e| PasswordError::InvalidSalt(e.to_string()))?;
                let mut hasher = Sha1::new();
                hasher.update(&salt_bytes);
                hasher.update(password.as_bytes());
                Ok(STANDARD.encode(hasher.finalize()))
            }
        }
    }

    /// Verify a plaintext password against the stored digest.
    ///
    /// The comparison covers the full digest in constant time; it never
    /// short-circuits on the first differing byte.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `format` - Storage format of the credential
    /// * `salt` - Base64-encoded salt from the credential record
    /// * `stored` - Digest held by the store
    ///
    /// # Returns
    /// True if the computed digest matches the stored one
    ///
    /// # Errors
    /// * `InvalidSalt` - Salt is not valid base64 (salted format only)
    pub fn verify(
        &self,
        password: &str,
        format: PasswordFormat,
        salt: &str,
        stored: &str,
    ) -> Result<bool, PasswordError> {
        let candidate = self.hash(password, format, salt)?;
        Ok(bool::from(
            candidate.as_bytes().ct_eq(stored.as_bytes()),
        ))
    }

    /// Generate a fresh salt for a new credential.
    ///
    /// # Returns
    /// 16 bytes of OS randomness, base64-encoded
    pub fn generate_salt() -> String {
        let mut buf = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut buf);
        STANDARD.encode(buf)
    }
}

impl Default for MembershipPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes_round_trip() {
        for format in [
            PasswordFormat::Clear,
            PasswordFormat::Hashed,
            PasswordFormat::HashedWithSalt,
        ] {
            assert_eq!(PasswordFormat::from_code(format.code()), Some(format));
        }
    }

    #[test]
    fn test_unknown_format_code_is_rejected() {
        assert_eq!(PasswordFormat::from_code(3), None);
        assert_eq!(PasswordFormat::from_code(-1), None);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = MembershipPasswordHasher::new();
        let salt = MembershipPasswordHasher::generate_salt();

        let first = hasher
            .hash("pass_word!", PasswordFormat::HashedWithSalt, &salt)
            .expect("Failed to hash password");
        let second = hasher
            .hash("pass_word!", PasswordFormat::HashedWithSalt, &salt)
            .expect("Failed to hash password");

        assert_eq!(first, second);
    }

    #[test]
    fn test_verify_all_formats() {
        let hasher = MembershipPasswordHasher::new();
        let salt = MembershipPasswordHasher::generate_salt();

        for format in [
            PasswordFormat::Clear,
            PasswordFormat::Hashed,
            PasswordFormat::HashedWithSalt,
        ] {
            let stored = hasher
                .hash("correct_horse", format, &salt)
                .expect("Failed to hash password");

            assert!(hasher
                .verify("correct_horse", format, &salt, &stored)
                .expect("Failed to verify password"));
            assert!(!hasher
                .verify("wrong_horse", format, &salt, &stored)
                .expect("Failed to verify password"));
        }
    }

    #[test]
    fn test_salt_changes_salted_digest() {
        let hasher = MembershipPasswordHasher::new();
        let salt_a = MembershipPasswordHasher::generate_salt();
        let salt_b = MembershipPasswordHasher::generate_salt();

        let digest_a = hasher
            .hash("pass_word!", PasswordFormat::HashedWithSalt, &salt_a)
            .expect("Failed to hash password");
        let digest_b = hasher
            .hash("pass_word!", PasswordFormat::HashedWithSalt, &salt_b)
            .expect("Failed to hash password");

        assert_ne!(digest_a, digest_b);
    }

    #[test]
    fn test_unsalted_formats_ignore_salt() {
        let hasher = MembershipPasswordHasher::new();

        let digest = hasher
            .hash("pass_word!", PasswordFormat::Hashed, "not base64 at all")
            .expect("Failed to hash password");
        assert!(!digest.is_empty());

        let clear = hasher
            .hash("pass_word!", PasswordFormat::Clear, "not base64 at all")
            .expect("Failed to hash password");
        assert_eq!(clear, "pass_word!");
    }

    #[test]
    fn test_invalid_salt_is_an_error() {
        let hasher = MembershipPasswordHasher::new();

        let result = hasher.hash("pass_word!", PasswordFormat::HashedWithSalt, "***");
        assert!(matches!(result, Err(PasswordError::InvalidSalt(_))));
    }

    #[test]
    fn test_generated_salt_is_16_bytes() {
        let salt = MembershipPasswordHasher::generate_salt();
        let decoded = STANDARD.decode(&salt).expect("Salt must be valid base64");
        assert_eq!(decoded.len(), 16);

        // Two salts colliding would mean the RNG is broken
        assert_ne!(salt, MembershipPasswordHasher::generate_salt());
    }
}
