//! Error taxonomy for token issuing, decoding and storage.

use thiserror::Error;

#[cfg(test)]
mod tests;

/// Token-related errors
///
/// Decode failures are split by kind so callers can tell an expired or
/// forged token (reject quietly) from a structurally broken one (alert).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Claim not found: {claim}")]
    ClaimNotFound { claim: String },

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Invalid token parameters: {message}")]
    InvalidParameters { message: String },
}

/// Token storage errors
///
/// Both variants mean the backing store could not be reached. They are
/// surfaced as-is; retry policy belongs to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Token storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Token storage timed out during {operation}")]
    Timeout { operation: String },
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DomainError {
    /// Whether the failure warrants logging and alerting rather than a
    /// quiet rejection of the presented token.
    pub fn requires_alert(&self) -> bool {
        match self {
            DomainError::Token(TokenError::TokenExpired)
            | DomainError::Token(TokenError::InvalidSignature)
            | DomainError::Token(TokenError::ClaimNotFound { .. }) => false,
            DomainError::Validation { .. } => false,
            DomainError::Token(_) | DomainError::Storage(_) | DomainError::Internal { .. } => true,
        }
    }

    /// Whether the backing token store could not be reached
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
