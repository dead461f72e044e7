//! Persistent token service: one active token per (subject, type)

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::entities::token::{
    ClaimMap, DecodedToken, TokenParameters, TokenParametersBuilder,
};
use crate::errors::DomainError;
use crate::repositories::TokenStorage;

use super::codec::{JwtTokenCodec, SignedTokenCodec};
use super::config::TokenServiceConfig;
use super::service::{mask_token, TokenService};

/// Token service that remembers the active token of every identity
///
/// `create` returns the stored token for a (subject, type) pair while one is
/// held and only signs a new token once the stored one is gone (invalidated,
/// swept, or expired out of the backend). Reads go straight to the codec.
///
/// Concurrent `create` calls for the same identity may both miss the store
/// and both sign; the store keeps the last write. Callers needing strict
/// mutual exclusion must serialise those calls themselves.
pub struct PersistentTokenService<S, C = JwtTokenCodec> {
    tokens: TokenService<C>,
    storage: S,
}

impl<S: TokenStorage> PersistentTokenService<S, JwtTokenCodec> {
    /// Creates a persistent token service signing HMAC JWTs
    ///
    /// # Arguments
    ///
    /// * `storage` - Token storage for the active token of each identity
    /// * `config` - Token service configuration
    pub fn new(storage: S, config: TokenServiceConfig) -> Self {
        let tokens = TokenService::new(config);
        Self { tokens, storage }
    }
}

impl<S: TokenStorage, C: SignedTokenCodec> PersistentTokenService<S, C> {
    /// Creates a persistent token service over a custom codec
    pub fn with_codec(storage: S, codec: C) -> Self {
        Self {
            tokens: TokenService::with_codec(codec),
            storage,
        }
    }

    /// See [`TokenService::parameters`]
    pub fn parameters(
        &self,
        subject: impl Into<String>,
        token_type: impl Into<String>,
    ) -> TokenParametersBuilder {
        self.tokens.parameters(subject, token_type)
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the active token for the identity, signing one if none is held
    ///
    /// A held token is returned unchanged: it is not re-signed, its expiry is
    /// not extended, and the claims in `params` are not applied to it. Only
    /// the subject and type of `params` matter on that path.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The held token, or a freshly signed and stored one
    /// * `Err(DomainError)` - Storage unavailable or signing failed
    pub async fn create(&self, params: &TokenParameters) -> Result<String, DomainError> {
        if let Some(token) = self.storage.get(params).await? {
            if !params.claims().is_empty() {
                debug!(
                    "Reusing active {} token for subject '{}'; supplied claims were not applied",
                    params.token_type(),
                    params.subject()
                );
            }
            return Ok(token);
        }

        let token = self.tokens.create(params)?;
        self.storage.save(&token, params).await?;
        Ok(token)
    }

    /// Removes every stored entry holding `token`
    ///
    /// The token still verifies if presented, but the next `create` for its
    /// identity signs a new one.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The token was stored and has been removed
    /// * `Ok(false)` - The token was not stored
    pub async fn invalidate(&self, token: &str) -> Result<bool, DomainError> {
        let removed = self.storage.remove_token(token).await?;
        info!("Invalidated token {}: {}", mask_token(token), removed);
        Ok(removed)
    }

    /// Removes the stored token of the identity in `params`
    pub async fn invalidate_params(&self, params: &TokenParameters) -> Result<bool, DomainError> {
        let removed = self.storage.remove(params).await?;
        info!(
            "Invalidated {} token for subject '{}': {}",
            params.token_type(),
            params.subject(),
            removed
        );
        Ok(removed)
    }

    /// See [`TokenService::decode`]
    pub fn decode(&self, token: &str) -> Result<DecodedToken, DomainError> {
        self.tokens.decode(token)
    }

    /// See [`TokenService::is_expired`]
    pub fn is_expired(&self, token: &str) -> Result<bool, DomainError> {
        self.tokens.is_expired(token)
    }

    /// See [`TokenService::has`]
    pub fn has(
        &self,
        token: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<bool, DomainError> {
        self.tokens.has(token, key, value)
    }

    pub fn subject(&self, token: &str) -> Result<String, DomainError> {
        self.tokens.subject(token)
    }

    pub fn token_type(&self, token: &str) -> Result<String, DomainError> {
        self.tokens.token_type(token)
    }

    pub fn claim(&self, token: &str, key: &str) -> Result<Option<Value>, DomainError> {
        self.tokens.claim(token, key)
    }

    pub fn claims(&self, token: &str) -> Result<ClaimMap, DomainError> {
        self.tokens.claims(token)
    }
}
