//! Mock implementation of TokenStorage for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::TokenParameters;
use crate::errors::{DomainError, StorageError};

use super::r#trait::TokenStorage;

/// Mock token storage for testing
///
/// Keys entries by `tokens:{subject}:{type}` without any expiry handling and
/// can be switched into an unavailable state to exercise error paths.
#[derive(Clone, Default)]
pub struct MockTokenStorage {
    tokens: Arc<RwLock<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MockTokenStorage {
    /// Create a new mock storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StorageError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Store a token under an arbitrary key
    pub async fn insert_raw(&self, key: &str, token: &str) {
        self.tokens
            .write()
            .await
            .insert(key.to_string(), token.to_string());
    }

    fn key(params: &TokenParameters) -> String {
        format!("tokens:{}:{}", params.subject(), params.token_type())
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "mock storage offline".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for MockTokenStorage {
    async fn save(&self, token: &str, params: &TokenParameters) -> Result<(), DomainError> {
        self.check()?;
        self.tokens
            .write()
            .await
            .insert(Self::key(params), token.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, token: &str, params: &TokenParameters) -> Result<bool, DomainError> {
        self.check()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&Self::key(params)).map(String::as_str) == Some(token))
    }

    async fn get(&self, params: &TokenParameters) -> Result<Option<String>, DomainError> {
        self.check()?;
        Ok(self.tokens.read().await.get(&Self::key(params)).cloned())
    }

    async fn remove_token(&self, token: &str) -> Result<bool, DomainError> {
        self.check()?;
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, stored| stored != token);
        Ok(tokens.len() < before)
    }

    async fn remove(&self, params: &TokenParameters) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.tokens.write().await.remove(&Self::key(params)).is_some())
    }
}
