//! Cache module for Redis-based token storage
//!
//! This module provides the Redis client with start-up retry and bounded
//! commands, and the `TokenStorage` implementation on top of it.

pub mod redis_client;
pub mod token_storage;


pub use redis_client::RedisClient;
pub use token_storage::{schema_for, RedisTokenStorage};

// Re-export commonly used types
pub use tk_shared::config::CacheConfig;
