//! Integration tests for the persistent token lifecycle over the in-process store

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use serde_json::json;

    use tk_core::{
        DomainError, InMemoryTokenStorage, PersistentTokenService, PrefixedKeySchema,
        TokenError, TokenParameters, TokenService, TokenServiceConfig, TokenStorage,
    };
    use tk_shared::config::MemoryStoreConfig;

    fn config() -> TokenServiceConfig {
        TokenServiceConfig::from("integration_test_secret".to_string())
    }

    fn fast_sweep() -> MemoryStoreConfig {
        MemoryStoreConfig {
            sweep_interval_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let storage = InMemoryTokenStorage::new(fast_sweep());
        let service = PersistentTokenService::new(storage.clone(), config());
        let params = TokenParameters::builder("user-42", "access", Duration::minutes(30))
            .claim("role", "admin")
            .claim("scopes", json!(["read", "write"]))
            .build()
            .unwrap();

        let token = service.create(&params).await.unwrap();
        assert_eq!(service.create(&params).await.unwrap(), token);

        assert_eq!(service.subject(&token).unwrap(), "user-42");
        assert_eq!(service.token_type(&token).unwrap(), "access");
        assert!(service.has(&token, "role", "admin").unwrap());
        assert_eq!(
            service.claim(&token, "scopes").unwrap(),
            Some(json!(["read", "write"]))
        );
        assert!(!service.is_expired(&token).unwrap());

        assert!(service.invalidate_params(&params).await.unwrap());
        let renewed = service.create(&params).await.unwrap();
        assert_ne!(renewed, token);

        storage.shutdown().await;
    }

    #[tokio::test]
    async fn test_expired_entry_is_swept_and_token_renewed() {
        let storage = InMemoryTokenStorage::new(fast_sweep());
        let service = PersistentTokenService::new(storage.clone(), config());
        let short = TokenParameters::builder("user-7", "otp", Duration::seconds(1))
            .build()
            .unwrap();

        let token = service.create(&short).await.unwrap();
        assert_eq!(storage.len().await, 1);

        tokio::time::sleep(StdDuration::from_millis(2500)).await;

        assert!(storage.is_empty().await);
        assert!(service.is_expired(&token).unwrap());
        assert!(matches!(
            service.subject(&token),
            Err(DomainError::Token(TokenError::TokenExpired))
        ));

        let renewed = service.create(&short).await.unwrap();
        assert_ne!(renewed, token);

        storage.shutdown().await;
    }

    #[tokio::test]
    async fn test_prefixed_schema_isolates_namespaces() {
        let tenant_a = InMemoryTokenStorage::with_schema(
            MemoryStoreConfig::default(),
            Arc::new(PrefixedKeySchema::new("tenant-a")),
        );
        let service = PersistentTokenService::new(tenant_a.clone(), config());
        let params = TokenParameters::builder("user-1", "access", Duration::minutes(5))
            .build()
            .unwrap();

        let token = service.create(&params).await.unwrap();
        assert!(tenant_a.exists(&token, &params).await.unwrap());
        assert!(service.invalidate(&token).await.unwrap());

        tenant_a.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_creates_for_distinct_identities() {
        let storage = InMemoryTokenStorage::new(MemoryStoreConfig::default());
        let service = Arc::new(PersistentTokenService::new(storage.clone(), config()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let params = TokenParameters::builder(format!("user-{}", i), "access", Duration::minutes(5))
                    .build()
                    .unwrap();
                service.create(&params).await.unwrap()
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.len().await, 20);
        storage.shutdown().await;
    }

    #[test]
    fn test_stateless_service_issues_fresh_tokens() {
        let service = TokenService::new(config());
        let params = TokenParameters::builder("user-42", "access", Duration::minutes(30))
            .issued_at(Utc::now())
            .build()
            .unwrap();

        let first = service.create(&params).unwrap();
        let second = service.create(&params).unwrap();

        assert_ne!(first, second);
        assert_eq!(service.subject(&first).unwrap(), service.subject(&second).unwrap());
    }
}
