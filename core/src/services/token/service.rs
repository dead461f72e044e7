//! Stateless token service: every `create` signs a new token

use chrono::Duration;
use serde_json::Value;
use tracing::debug;

use crate::domain::entities::token::{
    ClaimMap, DecodedToken, TokenParameters, TokenParametersBuilder,
};
use crate::errors::{DomainError, TokenError};

use super::codec::{JwtTokenCodec, SignedTokenCodec};
use super::config::TokenServiceConfig;

/// Service for signing tokens and reading them back
///
/// Reads never touch storage: they verify the signature and project fields
/// out of the payload. Expiry is enforced on every read except
/// [`is_expired`](Self::is_expired).
pub struct TokenService<C = JwtTokenCodec> {
    codec: C,
    default_expiry: Duration,
}

impl TokenService<JwtTokenCodec> {
    /// Creates a token service signing HMAC JWTs
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    pub fn new(config: TokenServiceConfig) -> Self {
        Self::with_codec(JwtTokenCodec::new(&config)).with_default_expiry(config.default_expiry)
    }
}

impl<C: SignedTokenCodec> TokenService<C> {
    /// Creates a token service over a custom codec
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            default_expiry: TokenServiceConfig::default().default_expiry,
        }
    }

    /// Replaces the lifetime used by [`parameters`](Self::parameters)
    pub fn with_default_expiry(mut self, default_expiry: Duration) -> Self {
        self.default_expiry = default_expiry;
        self
    }

    /// Starts token parameters issuing now and living for the configured
    /// default expiry
    pub fn parameters(
        &self,
        subject: impl Into<String>,
        token_type: impl Into<String>,
    ) -> TokenParametersBuilder {
        TokenParameters::builder(subject, token_type, self.default_expiry)
    }

    /// Signs a new token for `params`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed token
    /// * `Err(DomainError)` - `TokenError::TokenGenerationFailed` if signing failed
    pub fn create(&self, params: &TokenParameters) -> Result<String, DomainError> {
        let token = self.codec.encode(params)?;
        debug!(
            "Issued {} token for subject '{}' ({})",
            params.token_type(),
            params.subject(),
            mask_token(&token)
        );
        Ok(token)
    }

    /// Verifies a token and returns its decoded contents
    ///
    /// # Errors
    ///
    /// * `TokenError::InvalidSignature` - Signed under another key or tampered
    /// * `TokenError::TokenExpired` - Expiry has passed
    /// * `TokenError::MalformedToken` - Not a readable token
    pub fn decode(&self, token: &str) -> Result<DecodedToken, DomainError> {
        self.codec.decode(token)
    }

    /// Checks whether a token has expired by the current time
    ///
    /// An expired token yields `Ok(true)`; signature and format failures are
    /// still returned as errors.
    pub fn is_expired(&self, token: &str) -> Result<bool, DomainError> {
        match self.codec.decode(token) {
            Ok(decoded) => Ok(decoded.is_expired()),
            Err(DomainError::Token(TokenError::TokenExpired)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Checks whether the claim `key` of a token equals `value`
    ///
    /// # Errors
    ///
    /// * `TokenError::ClaimNotFound` - The token carries no claim `key`
    pub fn has(
        &self,
        token: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<bool, DomainError> {
        let decoded = self.codec.decode(token)?;
        let stored = decoded.claims.get(key).ok_or_else(|| TokenError::ClaimNotFound {
            claim: key.to_string(),
        })?;
        Ok(*stored == value.into())
    }

    /// Returns the subject of a token
    pub fn subject(&self, token: &str) -> Result<String, DomainError> {
        Ok(self.codec.decode(token)?.subject)
    }

    /// Returns the type of a token
    pub fn token_type(&self, token: &str) -> Result<String, DomainError> {
        Ok(self.codec.decode(token)?.token_type)
    }

    /// Returns a single custom claim, or `None` when the token lacks it
    pub fn claim(&self, token: &str, key: &str) -> Result<Option<Value>, DomainError> {
        Ok(self.codec.decode(token)?.claims.remove(key))
    }

    /// Returns the custom claims of a token
    pub fn claims(&self, token: &str) -> Result<ClaimMap, DomainError> {
        Ok(self.codec.decode(token)?.claims)
    }
}

/// Shortened form of a token that is safe to log
///
/// Only the tail of the signature is kept; JWT headers share a common prefix.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
    format!("...{}", tail)
}
