//! Redis-backed token storage
//!
//! Each identity's token lives under its [`KeySchema`] key with a Redis
//! expiry equal to the token's own, so Redis drops expired entries without
//! any sweeper on our side.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use tk_core::domain::TokenParameters;
use tk_core::errors::{DomainError, StorageError};
use tk_core::repositories::{DefaultKeySchema, KeySchema, PrefixedKeySchema, TokenStorage};

use super::redis_client::RedisClient;
use crate::config::CacheConfig;
use crate::InfrastructureError;

/// Token storage on a shared Redis keyspace
#[derive(Clone)]
pub struct RedisTokenStorage {
    client: RedisClient,
    schema: Arc<dyn KeySchema>,
}

impl RedisTokenStorage {
    /// Wraps a connected client, keying entries with `schema`
    pub fn new(client: RedisClient, schema: Arc<dyn KeySchema>) -> Self {
        Self { client, schema }
    }

    /// Connects using `config`; a `key_prefix` selects a [`PrefixedKeySchema`]
    pub async fn connect(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(config).await?;
        Ok(Self::new(client, schema_for(config)))
    }

    /// The underlying client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key_for(&self, params: &TokenParameters) -> String {
        self.schema
            .subject_token_key(params.subject(), params.token_type())
    }
}

/// Key schema implied by the cache configuration
pub fn schema_for(config: &CacheConfig) -> Arc<dyn KeySchema> {
    match config.key_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => Arc::new(PrefixedKeySchema::new(prefix)),
        _ => Arc::new(DefaultKeySchema),
    }
}

#[async_trait]
impl TokenStorage for RedisTokenStorage {
    async fn save(&self, token: &str, params: &TokenParameters) -> Result<(), DomainError> {
        let key = self.key_for(params);
        let expires_at_ms = params.expired_at().timestamp_millis();

        // an expired entry is stored as no entry
        if expires_at_ms <= Utc::now().timestamp_millis() {
            debug!("Token for '{}' already expired, clearing key", key);
            self.client.delete(&key).await.map_err(StorageError::from)?;
            return Ok(());
        }

        self.client
            .set_expiring_at(&key, token, expires_at_ms)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn exists(&self, token: &str, params: &TokenParameters) -> Result<bool, DomainError> {
        let stored = self.get(params).await?;
        Ok(stored.as_deref() == Some(token))
    }

    async fn get(&self, params: &TokenParameters) -> Result<Option<String>, DomainError> {
        let key = self.key_for(params);
        Ok(self.client.get(&key).await.map_err(StorageError::from)?)
    }

    async fn remove_token(&self, token: &str) -> Result<bool, DomainError> {
        let pattern = self.schema.token_key_pattern();
        let keys = self
            .client
            .scan_keys(&pattern)
            .await
            .map_err(StorageError::from)?;

        let mut removed = false;
        for key in keys {
            removed |= self
                .client
                .delete_if_equals(&key, token)
                .await
                .map_err(StorageError::from)?;
        }

        info!("Removed token from Redis: {}", removed);
        Ok(removed)
    }

    async fn remove(&self, params: &TokenParameters) -> Result<bool, DomainError> {
        let key = self.key_for(params);
        Ok(self.client.delete(&key).await.map_err(StorageError::from)?)
    }
}
