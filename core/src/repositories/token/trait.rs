//! Token storage trait defining the contract for persisted, expiring tokens.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::token::TokenParameters;
use crate::errors::DomainError;

/// Storage for the currently active token of each (subject, type) pair
///
/// Every entry is keyed by [`KeySchema::subject_token_key`](super::KeySchema)
/// of the parameters' subject and type, so at most one token is held per
/// identity. Writes for a key replace whatever was there (last write wins).
///
/// Implementations do not filter by expiry on reads. Expired entries vanish
/// through the backend's own expiry mechanism (sweep or key TTL).
///
/// # Errors
/// Backend failures surface as `DomainError::Storage` and are not retried.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Store `token` for the parameters' identity, expiring at
    /// `params.expired_at()`
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Duration;
    /// # use tk_core::domain::TokenParameters;
    /// # use tk_core::repositories::TokenStorage;
    /// # async fn example(storage: &impl TokenStorage) -> Result<(), Box<dyn std::error::Error>> {
    /// let params = TokenParameters::builder("user-42", "access", Duration::minutes(30)).build()?;
    /// storage.save("signed.token.value", &params).await?;
    /// assert_eq!(storage.get(&params).await?.as_deref(), Some("signed.token.value"));
    /// # Ok(())
    /// # }
    /// ```
    async fn save(&self, token: &str, params: &TokenParameters) -> Result<(), DomainError>;

    /// Check whether `token` is the one stored for the parameters' identity
    ///
    /// # Returns
    /// * `Ok(true)` - An entry exists and holds exactly `token`
    /// * `Ok(false)` - No entry, or it holds a different token
    async fn exists(&self, token: &str, params: &TokenParameters) -> Result<bool, DomainError>;

    /// Return the token stored for the parameters' identity, if any
    async fn get(&self, params: &TokenParameters) -> Result<Option<String>, DomainError>;

    /// Remove every entry holding `token`
    ///
    /// # Returns
    /// * `Ok(true)` - At least one entry was removed
    /// * `Ok(false)` - No entry held the token
    async fn remove_token(&self, token: &str) -> Result<bool, DomainError>;

    /// Remove the entry for the parameters' identity
    ///
    /// # Returns
    /// * `Ok(true)` - An entry existed and was removed
    /// * `Ok(false)` - Nothing was stored for the identity
    async fn remove(&self, params: &TokenParameters) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    async fn save(&self, token: &str, params: &TokenParameters) -> Result<(), DomainError> {
        (**self).save(token, params).await
    }

    async fn exists(&self, token: &str, params: &TokenParameters) -> Result<bool, DomainError> {
        (**self).exists(token, params).await
    }

    async fn get(&self, params: &TokenParameters) -> Result<Option<String>, DomainError> {
        (**self).get(params).await
    }

    async fn remove_token(&self, token: &str) -> Result<bool, DomainError> {
        (**self).remove_token(token).await
    }

    async fn remove(&self, params: &TokenParameters) -> Result<bool, DomainError> {
        (**self).remove(params).await
    }
}
