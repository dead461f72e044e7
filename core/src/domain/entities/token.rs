//! Token entities: creation parameters, the signed payload and stored entries.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{DomainError, TokenError};

/// Payload field carrying the token type
pub const TOKEN_TYPE_CLAIM: &str = "tokenType";

/// Payload fields owned by the token itself; custom claims may not reuse them
pub const RESERVED_CLAIMS: [&str; 5] = ["sub", "iat", "exp", "jti", TOKEN_TYPE_CLAIM];

/// Custom claims embedded in a token
pub type ClaimMap = HashMap<String, Value>;

/// Parameters for issuing a single token
///
/// Built once per creation request through [`TokenParameters::builder`] and
/// never mutated afterwards. `expired_at` is always strictly after
/// `issued_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParameters {
    subject: String,
    token_type: String,
    claims: ClaimMap,
    issued_at: DateTime<Utc>,
    expired_at: DateTime<Utc>,
}

impl TokenParameters {
    /// Starts a builder issuing now and expiring after `duration`
    ///
    /// # Example
    /// ```
    /// use chrono::Duration;
    /// use tk_core::domain::TokenParameters;
    ///
    /// let params = TokenParameters::builder("user-42", "access", Duration::minutes(30))
    ///     .claim("role", "admin")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.subject(), "user-42");
    /// ```
    pub fn builder(
        subject: impl Into<String>,
        token_type: impl Into<String>,
        duration: Duration,
    ) -> TokenParametersBuilder {
        TokenParametersBuilder {
            subject: subject.into(),
            token_type: token_type.into(),
            claims: ClaimMap::new(),
            issued_at: Utc::now(),
            duration,
            expired_at: None,
        }
    }

    /// The identity the token is issued for
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Discriminator between token classes of one subject
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expired_at(&self) -> DateTime<Utc> {
        self.expired_at
    }

    /// Time between issuing and expiry
    pub fn lifetime(&self) -> Duration {
        self.expired_at - self.issued_at
    }
}

/// Builder for [`TokenParameters`]
#[derive(Debug, Clone)]
pub struct TokenParametersBuilder {
    subject: String,
    token_type: String,
    claims: ClaimMap,
    issued_at: DateTime<Utc>,
    duration: Duration,
    expired_at: Option<DateTime<Utc>>,
}

impl TokenParametersBuilder {
    /// Adds a single claim, replacing any earlier value under `key`
    pub fn claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    /// Merges a map of claims into the parameters
    pub fn claims(mut self, claims: ClaimMap) -> Self {
        self.claims.extend(claims);
        self
    }

    /// Overrides the issue time; expiry follows unless set explicitly
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Overrides the expiry time
    pub fn expired_at(mut self, expired_at: DateTime<Utc>) -> Self {
        self.expired_at = Some(expired_at);
        self
    }

    /// Validates and freezes the parameters
    ///
    /// # Errors
    /// * `TokenError::InvalidParameters` - empty subject or type, a reserved
    ///   claim name, or `expired_at` not after `issued_at`
    pub fn build(self) -> Result<TokenParameters, DomainError> {
        if self.subject.is_empty() {
            return Err(invalid("subject must not be empty"));
        }
        if self.token_type.is_empty() {
            return Err(invalid("token type must not be empty"));
        }
        if let Some(reserved) = self
            .claims
            .keys()
            .find(|key| RESERVED_CLAIMS.contains(&key.as_str()))
        {
            return Err(invalid(&format!("claim '{}' is reserved", reserved)));
        }

        let expired_at = match self.expired_at {
            Some(expired_at) => expired_at,
            None => self
                .issued_at
                .checked_add_signed(self.duration)
                .ok_or_else(|| invalid("duration out of range"))?,
        };
        if expired_at <= self.issued_at {
            return Err(invalid("expiry must be after issue time"));
        }

        Ok(TokenParameters {
            subject: self.subject,
            token_type: self.token_type,
            claims: self.claims,
            issued_at: self.issued_at,
            expired_at,
        })
    }
}

fn invalid(message: &str) -> DomainError {
    DomainError::Token(TokenError::InvalidParameters {
        message: message.to_string(),
    })
}

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Token type
    #[serde(rename = "tokenType")]
    pub token_type: String,

    /// Custom claims, flattened into the payload
    #[serde(flatten)]
    pub extra: ClaimMap,
}

impl Claims {
    /// Creates the payload for a fresh token
    pub fn from_parameters(params: &TokenParameters) -> Self {
        Self {
            sub: params.subject.clone(),
            iat: params.issued_at.timestamp(),
            exp: params.expired_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: params.token_type.clone(),
            extra: params.claims.clone(),
        }
    }
}

/// A verified token projected back into domain values
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub subject: String,
    pub token_type: String,
    pub claims: ClaimMap,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    pub token_id: String,
}

impl DecodedToken {
    /// Whether the expiry instant has already passed
    pub fn is_expired(&self) -> bool {
        self.expired_at < Utc::now()
    }
}

impl TryFrom<Claims> for DecodedToken {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let issued_at = timestamp(claims.iat)?;
        let expired_at = timestamp(claims.exp)?;
        Ok(Self {
            subject: claims.sub,
            token_type: claims.token_type,
            claims: claims.extra,
            issued_at,
            expired_at,
            token_id: claims.jti,
        })
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(TokenError::MalformedToken)
}

/// What a token store holds for one (subject, type) key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Checks whether the entry is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
