//! Integration tests for the Redis token storage
//!
//! These tests require a running Redis instance (7.0+ for `PXAT`).
//! Run with: cargo test -p tk_infra --test redis_integration -- --ignored

use chrono::{Duration, Utc};
use std::sync::Arc;

use tk_core::{
    KeySchema, PersistentTokenService, TokenParameters, TokenServiceConfig, TokenStorage,
};
use tk_infra::cache::{CacheConfig, RedisClient, RedisTokenStorage};

fn redis_config(prefix: &str) -> CacheConfig {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("tk-test-{}", prefix))
}

fn params(subject: &str, minutes: i64) -> TokenParameters {
    TokenParameters::builder(subject, "access", Duration::minutes(minutes))
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_connection() {
    let client = RedisClient::new(&redis_config("connect")).await.unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_save_get_exists_remove() {
    let storage = RedisTokenStorage::connect(&redis_config("crud")).await.unwrap();
    let params = params("user-1", 5);

    storage.save("token-a", &params).await.unwrap();
    assert_eq!(storage.get(&params).await.unwrap(), Some("token-a".to_string()));
    assert!(storage.exists("token-a", &params).await.unwrap());
    assert!(!storage.exists("token-b", &params).await.unwrap());

    assert!(storage.remove(&params).await.unwrap());
    assert!(!storage.remove(&params).await.unwrap());
    assert_eq!(storage.get(&params).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_remove_by_token_scans_keyspace() {
    let storage = RedisTokenStorage::connect(&redis_config("scan")).await.unwrap();
    let first = params("user-1", 5);
    let second = params("user-2", 5);

    storage.save("shared-token", &first).await.unwrap();
    storage.save("shared-token", &second).await.unwrap();

    assert!(storage.remove_token("shared-token").await.unwrap());
    assert_eq!(storage.get(&first).await.unwrap(), None);
    assert_eq!(storage.get(&second).await.unwrap(), None);
    assert!(!storage.remove_token("shared-token").await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_entry_expires_with_token() {
    let storage = RedisTokenStorage::connect(&redis_config("expiry")).await.unwrap();
    let params = TokenParameters::builder("user-1", "otp", Duration::seconds(1))
        .build()
        .unwrap();

    storage.save("short-lived", &params).await.unwrap();
    assert!(storage.exists("short-lived", &params).await.unwrap());

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    assert_eq!(storage.get(&params).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_expired_parameters_clear_entry() {
    let storage = RedisTokenStorage::connect(&redis_config("expired")).await.unwrap();
    let now = Utc::now();
    let live = params("user-1", 5);
    let expired = TokenParameters::builder("user-1", "access", Duration::seconds(1))
        .issued_at(now - Duration::minutes(2))
        .expired_at(now - Duration::minutes(1))
        .build()
        .unwrap();

    storage.save("live", &live).await.unwrap();
    storage.save("dead", &expired).await.unwrap();

    assert_eq!(storage.get(&live).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_lifecycle_over_redis() {
    let storage = Arc::new(RedisTokenStorage::connect(&redis_config("lifecycle")).await.unwrap());
    let service = PersistentTokenService::new(
        storage.clone(),
        TokenServiceConfig::from("redis_integration_secret".to_string()),
    );
    let params = params("user-9", 5);

    let token = service.create(&params).await.unwrap();
    assert_eq!(service.create(&params).await.unwrap(), token);

    assert!(service.invalidate(&token).await.unwrap());
    let renewed = service.create(&params).await.unwrap();
    assert_ne!(renewed, token);

    service.invalidate_params(&params).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_remove_by_stale_token_keeps_newer_value() {
    let storage = RedisTokenStorage::connect(&redis_config("stale")).await.unwrap();
    let params = params("user-1", 5);

    storage.save("old-token", &params).await.unwrap();
    storage.save("new-token", &params).await.unwrap();

    assert!(!storage.remove_token("old-token").await.unwrap());
    assert_eq!(storage.get(&params).await.unwrap(), Some("new-token".to_string()));

    storage.remove(&params).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_compare_and_delete_checks_current_value() {
    let client = RedisClient::new(&redis_config("cad")).await.unwrap();
    let key = "tk-test-cad:tokens:user-1:access";
    let far_future = Utc::now().timestamp_millis() + 60_000;

    client.set_expiring_at(key, "new-token", far_future).await.unwrap();
    assert!(!client.delete_if_equals(key, "old-token").await.unwrap());
    assert_eq!(client.get(key).await.unwrap(), Some("new-token".to_string()));

    assert!(client.delete_if_equals(key, "new-token").await.unwrap());
    assert_eq!(client.get(key).await.unwrap(), None);
}

/// Keys of the form `tk-test-session/{type}/{subject}`
struct SessionKeySchema;

impl KeySchema for SessionKeySchema {
    fn subject_token_key(&self, subject: &str, token_type: &str) -> String {
        format!("tk-test-session/{}/{}", token_type, subject)
    }

    fn token_key_pattern(&self) -> String {
        "tk-test-session/*".to_string()
    }
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_remove_by_token_with_custom_schema() {
    let client = RedisClient::new(&redis_config("session")).await.unwrap();
    let storage = RedisTokenStorage::new(client, Arc::new(SessionKeySchema));
    let params = params("user-1", 5);

    storage.save("session-token", &params).await.unwrap();
    assert!(storage.remove_token("session-token").await.unwrap());
    assert_eq!(storage.get(&params).await.unwrap(), None);
}
