//! Authentication primitives for the legacy membership adapter
//!
//! Provides the building blocks the membership domain service composes:
//! - Legacy membership password hashing (clear, hashed, salted-hash formats)
//! - Time-limited, purpose-bound authenticated encryption for opaque tokens
//!
//! Each consumer defines its own ports and adapts these implementations.
//! Nothing in this crate performs I/O or holds shared mutable state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::MembershipPasswordHasher;
//! use auth::PasswordFormat;
//!
//! let hasher = MembershipPasswordHasher::new();
//! let salt = MembershipPasswordHasher::generate_salt();
//! let digest = hasher
//!     .hash("my_password", PasswordFormat::HashedWithSalt, &salt)
//!     .unwrap();
//! assert!(hasher
//!     .verify("my_password", PasswordFormat::HashedWithSalt, &salt, &digest)
//!     .unwrap());
//! ```
//!
//! ## Time-Limited Tokens
//! ```
//! use auth::TimeLimitedProtector;
//! use chrono::Duration;
//!
//! let protector = TimeLimitedProtector::new(&[7u8; 32], "example/demo");
//! let token = protector.protect("payload", Duration::days(1)).unwrap();
//! assert_eq!(protector.unprotect(&token).unwrap(), "payload");
//!
//! // A protector with a different purpose can never open the token.
//! let other = TimeLimitedProtector::new(&[7u8; 32], "example/other");
//! assert!(other.unprotect(&token).is_err());
//! ```

pub mod password;
pub mod protect;

// Re-export commonly used items
pub use password::MembershipPasswordHasher;
pub use password::PasswordError;
pub use password::PasswordFormat;
pub use protect::ProtectError;
pub use protect::TimeLimitedProtector;
