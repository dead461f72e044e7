use super::*;

#[test]
fn test_token_error_messages() {
    assert_eq!(TokenError::TokenExpired.to_string(), "Token expired");
    assert_eq!(
        TokenError::ClaimNotFound { claim: "role".to_string() }.to_string(),
        "Claim not found: role"
    );
}

#[test]
fn test_domain_error_is_transparent_over_token_error() {
    let err: DomainError = TokenError::InvalidSignature.into();
    assert_eq!(err.to_string(), "Token signature verification failed");
    assert!(matches!(err, DomainError::Token(TokenError::InvalidSignature)));
}

#[test]
fn test_requires_alert_classification() {
    assert!(!DomainError::from(TokenError::TokenExpired).requires_alert());
    assert!(!DomainError::from(TokenError::InvalidSignature).requires_alert());
    assert!(DomainError::from(TokenError::MalformedToken).requires_alert());

    let unavailable = DomainError::from(StorageError::Unavailable {
        message: "connection refused".to_string(),
    });
    assert!(unavailable.requires_alert());
    assert!(unavailable.is_storage_unavailable());
}
