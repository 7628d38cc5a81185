use std::env;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::membership::reset::ResetPasswordReason;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub password_reset: PasswordResetConfig,
    pub protector: ProtectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordResetConfig {
    /// Whether self-service password reset is offered at all
    pub allow_password_reset: bool,
    pub first_connection_token_days: f64,
    pub forgotten_token_days: f64,
}

impl PasswordResetConfig {
    /// Token lifetime configured for a reset reason.
    pub fn token_lifetime_days(&self, reason: ResetPasswordReason) -> f64 {
        match reason {
            ResetPasswordReason::FirstConnection => self.first_connection_token_days,
            ResetPasswordReason::Forgotten => self.forgotten_token_days,
        }
    }
}

/// Keys for the two independent protectors, base64-encoded 32-byte values.
#[derive(Debug, Deserialize, Clone)]
pub struct ProtectorConfig {
    pub reset_token_key: String,
    pub reset_link_key: String,
}

impl ProtectorConfig {
    /// Decoded key for the reset-token protector.
    pub fn reset_token_key_bytes(&self) -> anyhow::Result<[u8; 32]> {
        decode_key(&self.reset_token_key)
    }

    /// Decoded key for the reset-link user-id protector.
    pub fn reset_link_key_bytes(&self) -> anyhow::Result<[u8; 32]> {
        decode_key(&self.reset_link_key)
    }
}

fn decode_key(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = STANDARD
        .decode(encoded)
        .context("protector key is not valid base64")?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("protector key must be 32 bytes, got {}", len))
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PASSWORD_RESET__ALLOW_PASSWORD_RESET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
