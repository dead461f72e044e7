//! Redis client implementation
//!
//! A thin async wrapper over a multiplexed Redis connection holding exactly
//! the commands the token store needs. Connection establishment is retried
//! with exponential backoff; individual commands are not retried and are
//! bounded by the configured response timeout.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisResult, Script};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::InfrastructureError;

/// Base delay before the first reconnect attempt
const CONNECT_RETRY_DELAY_MS: u64 = 100;

/// Upper bound for the reconnect backoff
const CONNECT_RETRY_DELAY_CAP_MS: u64 = 5000;

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Deletes KEYS[1] only while it still holds ARGV[1]
const COMPARE_AND_DELETE: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
";

/// Redis client over a shared multiplexed connection
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Per-command response timeout
    response_timeout: Duration,
    /// Server-side compare-and-delete
    compare_and_delete: Script,
}

impl RedisClient {
    /// Connect to Redis, retrying `config.connect_retries` times
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use tk_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379");
    ///     let client = RedisClient::new(&config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, config.connect_retries, CONNECT_RETRY_DELAY_MS).await
    }

    /// Connect to Redis with a custom retry policy
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_retries` - Maximum number of connection attempts
    /// * `retry_delay_ms` - Base delay between attempts in milliseconds
    pub async fn new_with_retry_config(
        config: &CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(
            client,
            Duration::from_secs(config.connection_timeout),
            max_retries.max(1),
            retry_delay_ms,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            response_timeout: Duration::from_secs(config.response_timeout),
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        connect_timeout: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
            {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Timeout("connect".to_string())),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(CONNECT_RETRY_DELAY_CAP_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Set a value that expires at an absolute unix time in milliseconds
    ///
    /// Issued as a single `SET key value PXAT ms`, so the value is never
    /// visible without its expiry.
    pub async fn set_expiring_at(
        &self,
        key: &str,
        value: &str,
        expires_at_ms: i64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' expiring at {}ms", key, expires_at_ms);

        let mut conn = self.connection.clone();
        self.execute("SET", async move {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PXAT")
                .arg(expires_at_ms)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    /// Get a value, `None` if the key is missing or has expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        let mut conn = self.connection.clone();
        let value = self
            .execute("GET", async move { conn.get::<_, Option<String>>(key).await })
            .await?;

        if value.is_none() {
            debug!("Key '{}' not found", key);
        }
        Ok(value)
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let mut conn = self.connection.clone();
        let deleted: u32 = self
            .execute("DEL", async move { conn.del::<_, u32>(key).await })
            .await?;
        Ok(deleted > 0)
    }

    /// Delete a key only if it still holds `expected`
    ///
    /// The comparison and the delete run as one server-side script, so a
    /// value written concurrently is never removed.
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if the key held `expected` and was deleted
    pub async fn delete_if_equals(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}' if unchanged", key);

        let mut conn = self.connection.clone();
        let script = &self.compare_and_delete;
        let deleted: u32 = self
            .execute("EVALSHA", async move {
                script
                    .key(key)
                    .arg(expected)
                    .invoke_async::<_, u32>(&mut conn)
                    .await
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Collect every key matching a glob pattern
    ///
    /// Walks the keyspace with `SCAN` cursors; each round trip is bounded by
    /// the response timeout separately.
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, InfrastructureError> {
        debug!("Scanning keys matching '{}'", pattern);

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let mut conn = self.connection.clone();
            let (next, batch): (u64, Vec<String>) = self
                .execute("SCAN", async move {
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                })
                .await?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Scan of '{}' found {} keys", pattern, keys.len());
        Ok(keys)
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let response: String = self
            .execute("PING", async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Run one command under the response timeout
    async fn execute<T, F>(&self, operation: &str, command: F) -> Result<T, InfrastructureError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.response_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Redis {} failed: {}", operation, e);
                Err(InfrastructureError::Cache(e))
            }
            Err(_) => {
                error!(
                    "Redis {} timed out after {}ms",
                    operation,
                    self.response_timeout.as_millis()
                );
                Err(InfrastructureError::Timeout(operation.to_string()))
            }
        }
    }
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
