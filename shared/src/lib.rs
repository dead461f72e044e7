//! Shared configuration and logging setup for TokenKeeper
//!
//! This crate provides functionality used across the workspace:
//! - Configuration types (JWT signing, token storage backends, logging)
//! - Tracing subscriber initialisation

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, JwtConfig, LoggingConfig, MemoryStoreConfig,
    StorageBackendKind, StorageConfig,
};
pub use logging::init_tracing;
