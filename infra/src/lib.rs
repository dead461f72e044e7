//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for TokenKeeper. It
//! provides the networked token store and the layered configuration loader.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client and the Redis-backed `TokenStorage`
//! - **Config**: `.env` + TOML file + `TOKENS__*` environment layering
//! - **Storage selection**: building the configured token store

use std::sync::Arc;

use tk_core::errors::StorageError;
use tk_core::repositories::{InMemoryTokenStorage, TokenStorage};
use tk_shared::config::{StorageBackendKind, StorageConfig};

/// Cache module - Redis client and token storage
pub mod cache;

/// Configuration module for infrastructure services
pub mod config;

pub use config::load_config;

/// Build the token store selected by `config.backend`
///
/// The in-process store spawns its sweeper on the current Tokio runtime; the
/// Redis store connects (with start-up retry) before returning.
pub async fn create_token_storage(
    config: &StorageConfig,
) -> Result<Arc<dyn TokenStorage>, InfrastructureError> {
    match config.backend {
        StorageBackendKind::Memory => {
            tracing::info!(
                "Using in-process token storage (sweep every {}ms)",
                config.memory.sweep_interval().as_millis()
            );
            Ok(Arc::new(InMemoryTokenStorage::new(config.memory.clone())))
        }
        StorageBackendKind::Redis => {
            tracing::info!("Using Redis token storage");
            let storage = cache::RedisTokenStorage::connect(&config.redis).await?;
            Ok(Arc::new(storage))
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation exceeded its time bound
    #[error("Timed out during {0}")]
    Timeout(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for StorageError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Timeout(operation) => StorageError::Timeout { operation },
            other => StorageError::Unavailable {
                message: other.to_string(),
            },
        }
    }
}
