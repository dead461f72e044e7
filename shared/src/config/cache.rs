//! Token storage configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Redis connection configuration for the networked token store
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Response timeout in seconds, applied to every command
    pub response_timeout: u64,

    /// Optional namespace put in front of every token key
    pub key_prefix: Option<String>,

    /// Connection attempts made at start-up before giving up
    pub connect_retries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            response_timeout: 5,
            key_prefix: None,
            connect_retries: 3,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("REDIS_URL").unwrap_or(defaults.url),
            connection_timeout: parse_env("REDIS_CONNECTION_TIMEOUT")
                .unwrap_or(defaults.connection_timeout),
            response_timeout: parse_env("REDIS_RESPONSE_TIMEOUT")
                .unwrap_or(defaults.response_timeout),
            key_prefix: env::var("REDIS_KEY_PREFIX").ok(),
            connect_retries: defaults.connect_retries,
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all token keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// In-process token store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Interval between expiry sweeps in milliseconds
    pub sweep_interval_ms: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1000,
        }
    }
}

impl MemoryStoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            sweep_interval_ms: parse_env("TOKEN_SWEEP_INTERVAL_MS").unwrap_or(1000),
        }
    }

    /// Sweep interval as a `Duration`
    pub fn sweep_interval(&self) -> std::time::Duration {
        // A zero interval would make the sweeper spin
        std::time::Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    Redis,
}

impl std::str::FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackendKind::Memory),
            "redis" => Ok(StorageBackendKind::Redis),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Token storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend holds issued tokens
    pub backend: StorageBackendKind,

    /// In-process store settings
    pub memory: MemoryStoreConfig,

    /// Redis store settings
    pub redis: CacheConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            memory: MemoryStoreConfig::default(),
            redis: CacheConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            backend: env::var("TOKEN_STORAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(StorageBackendKind::Memory),
            memory: MemoryStoreConfig::from_env(),
            redis: CacheConfig::from_env(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
