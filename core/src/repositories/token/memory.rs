//! In-process token storage with a background expiry sweep.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use tk_shared::config::MemoryStoreConfig;

use crate::domain::entities::token::{StoredEntry, TokenParameters};
use crate::errors::DomainError;

use super::r#trait::TokenStorage;
use super::schema::{DefaultKeySchema, KeySchema};
use super::sweeper::{sweep_entries, EntryMap, SweepResult, SweeperHandle};

/// Token storage held in process memory
///
/// Entries live in a shared map guarded by an async `RwLock`; every
/// operation takes the lock once, so an entry is either fully present or
/// fully absent for any reader. A sweeper task evicts expired entries every
/// `sweep_interval_ms`.
///
/// Cloning is cheap and all clones share the same entries and sweeper. The
/// sweeper stops on [`shutdown`](Self::shutdown) or when the last clone is
/// dropped.
#[derive(Clone)]
pub struct InMemoryTokenStorage {
    entries: EntryMap,
    schema: Arc<dyn KeySchema>,
    sweeper: Arc<SweeperHandle>,
}

impl InMemoryTokenStorage {
    /// Create a store using the default `tokens:{subject}:{type}` keys
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, since the sweeper is
    /// spawned immediately.
    ///
    /// # Example
    /// ```
    /// use tk_core::repositories::InMemoryTokenStorage;
    /// use tk_shared::config::MemoryStoreConfig;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let storage = InMemoryTokenStorage::new(MemoryStoreConfig::default());
    ///     storage.shutdown().await;
    /// }
    /// ```
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self::with_schema(config, Arc::new(DefaultKeySchema))
    }

    /// Create a store with a custom key schema
    pub fn with_schema(config: MemoryStoreConfig, schema: Arc<dyn KeySchema>) -> Self {
        let entries: EntryMap = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = SweeperHandle::spawn(entries.clone(), config.sweep_interval());

        Self {
            entries,
            schema,
            sweeper: Arc::new(sweeper),
        }
    }

    /// Run one sweep now instead of waiting for the next tick
    pub async fn sweep_expired(&self) -> SweepResult {
        sweep_entries(&self.entries).await
    }

    /// Stop the background sweeper and wait for it to exit
    ///
    /// The store stays usable; expired entries are simply no longer evicted.
    pub async fn shutdown(&self) {
        self.sweeper.stop().await;
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn key_for(&self, params: &TokenParameters) -> String {
        self.schema
            .subject_token_key(params.subject(), params.token_type())
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn save(&self, token: &str, params: &TokenParameters) -> Result<(), DomainError> {
        let key = self.key_for(params);
        debug!("Storing token under '{}'", key);

        self.entries
            .write()
            .await
            .insert(key, StoredEntry::new(token, params.expired_at()));
        Ok(())
    }

    async fn exists(&self, token: &str, params: &TokenParameters) -> Result<bool, DomainError> {
        let key = self.key_for(params);
        let entries = self.entries.read().await;
        Ok(entries.get(&key).is_some_and(|entry| entry.token == token))
    }

    async fn get(&self, params: &TokenParameters) -> Result<Option<String>, DomainError> {
        let key = self.key_for(params);
        let entries = self.entries.read().await;
        Ok(entries.get(&key).map(|entry| entry.token.clone()))
    }

    async fn remove_token(&self, token: &str) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|_, entry| entry.token != token);

        let removed = before - entries.len();
        if removed > 1 {
            debug!("Token was stored under {} keys, all removed", removed);
        }
        Ok(removed > 0)
    }

    async fn remove(&self, params: &TokenParameters) -> Result<bool, DomainError> {
        let key = self.key_for(params);
        let removed = self.entries.write().await.remove(&key).is_some();
        debug!("Removing token under '{}': {}", key, removed);
        Ok(removed)
    }
}
