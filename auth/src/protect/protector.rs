use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::aead::KeyInit;
use chacha20poly1305::aead::Payload;
use chacha20poly1305::ChaCha20Poly1305;
use chacha20poly1305::Key;
use chacha20poly1305::Nonce;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::ProtectError;

const NONCE_BYTES: usize = 12;
const EXPIRY_BYTES: usize = 8;

/// Time-limited, purpose-bound protector for opaque tokens.
///
/// Seals a payload with ChaCha20-Poly1305. The purpose string is bound as
/// associated data, so a token sealed under one purpose can never be opened
/// by a protector constructed with another, even with the same key. The
/// expiry instant travels inside the sealed envelope and is enforced on
/// open, so an expired token fails exactly like a tampered one would.
///
/// Each protector is an explicit capability owned by its consumer; there is
/// no process-wide instance.
pub struct TimeLimitedProtector {
    cipher: ChaCha20Poly1305,
    purpose: String,
}

impl TimeLimitedProtector {
    /// Create a new protector from a key and purpose context.
    ///
    /// # Arguments
    /// * `key` - 256-bit key (store securely, never in code)
    /// * `purpose` - Context string distinguishing this token type from
    ///   every other protector in the application
    pub fn new(key: &[u8; 32], purpose: impl Into<String>) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
            purpose: purpose.into(),
        }
    }

    /// Seal a payload into an opaque, URL-safe token.
    ///
    /// # Arguments
    /// * `plaintext` - Payload to seal
    /// * `lifetime` - How long the token stays openable
    ///
    /// # Returns
    /// Base64 URL-safe token carrying `nonce || ciphertext`
    ///
    /// # Errors
    /// * `SealFailed` - Encryption failed or the expiry instant overflowed
    pub fn protect(&self, plaintext: &str, lifetime: Duration) -> Result<String, ProtectError> {
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| ProtectError::SealFailed("expiry out of range".to_string()))?;

        let mut envelope = Vec::with_capacity(EXPIRY_BYTES + plaintext.len());
        envelope.extend_from_slice(&expires_at.timestamp_millis().to_be_bytes());
        envelope.extend_from_slice(plaintext.as_bytes());

        let mut nonce_bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: &envelope,
            aad: self.purpose.as_bytes(),
        };
        let ciphertext = self
            .cipher
            .encrypt(nonce, payload)
            .map_err(|e| ProtectError::SealFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a token sealed by [`protect`](Self::protect).
    ///
    /// # Arguments
    /// * `token` - Opaque token string
    ///
    /// # Returns
    /// The original payload
    ///
    /// # Errors
    /// * `OpenFailed` - Token is malformed, tampered with, or was sealed
    ///   under a different key or purpose
    /// * `Expired` - Token is authentic but its lifetime has elapsed
    pub fn unprotect(&self, token: &str) -> Result<String, ProtectError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ProtectError::OpenFailed(e.to_string()))?;
        if sealed.len() < NONCE_BYTES {
            return Err(ProtectError::OpenFailed("token too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_BYTES);
        let payload = Payload {
            msg: ciphertext,
            aad: self.purpose.as_bytes(),
        };
        let envelope = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), payload)
            .map_err(|e| ProtectError::OpenFailed(e.to_string()))?;
        if envelope.len() < EXPIRY_BYTES {
            return Err(ProtectError::OpenFailed("envelope too short".to_string()));
        }

        let (expiry_bytes, plaintext) = envelope.split_at(EXPIRY_BYTES);
        let expiry_millis = i64::from_be_bytes(
            expiry_bytes
                .try_into()
                .map_err(|_| ProtectError::OpenFailed("envelope too short".to_string()))?,
        );
        let expires_at = DateTime::<Utc>::from_timestamp_millis(expiry_millis)
            .ok_or_else(|| ProtectError::OpenFailed("expiry out of range".to_string()))?;
        if expires_at < Utc::now() {
            return Err(ProtectError::Expired);
        }

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| ProtectError::OpenFailed(e.to_string()))
    }
}
