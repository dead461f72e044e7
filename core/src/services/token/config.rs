//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::str::FromStr;

use tk_shared::config::JwtConfig;

use crate::errors::DomainError;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Token lifetime used by `TokenService::parameters`
    pub default_expiry: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(JwtConfig::default().secret)
    }
}

impl From<String> for TokenServiceConfig {
    fn from(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            algorithm: Algorithm::HS256,
            default_expiry: Duration::seconds(JwtConfig::default().default_expiry_seconds),
        }
    }
}

impl TokenServiceConfig {
    /// Build from the shared JWT configuration
    ///
    /// # Errors
    /// * `DomainError::Validation` - unknown or non-HMAC algorithm, an empty
    ///   secret, or a non-positive default expiry
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            DomainError::Validation {
                message: format!("Unknown JWT algorithm: {}", config.algorithm),
            }
        })?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(DomainError::Validation {
                message: format!(
                    "JWT algorithm {} needs a key pair; only HMAC secrets are supported",
                    config.algorithm
                ),
            });
        }

        if config.default_expiry_seconds <= 0 {
            return Err(DomainError::Validation {
                message: format!(
                    "JWT default expiry must be positive, got {}s",
                    config.default_expiry_seconds
                ),
            });
        }

        if config.secret.is_empty() {
            return Err(DomainError::Validation {
                message: "JWT secret must not be empty".to_string(),
            });
        }

        if config.is_using_default_secret() {
            tracing::warn!("Token service is using the development JWT secret");
        }

        Ok(Self {
            jwt_secret: config.secret.clone(),
            algorithm,
            default_expiry: Duration::seconds(config.default_expiry_seconds),
        })
    }
}
