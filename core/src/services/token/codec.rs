//! Signed token codec: the seam between the services and the JWT library.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{Claims, DecodedToken, TokenParameters};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Encodes token parameters into a signed string and verifies it back
///
/// `decode` must fail with `TokenError::InvalidSignature` for a token signed
/// under another key, `TokenError::TokenExpired` once the expiry has passed
/// (signature checked first), and `TokenError::MalformedToken` for anything
/// else it cannot read.
pub trait SignedTokenCodec: Send + Sync {
    fn encode(&self, params: &TokenParameters) -> Result<String, DomainError>;

    fn decode(&self, token: &str) -> Result<DecodedToken, DomainError>;
}

/// HMAC-signed JWT codec
pub struct JwtTokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(config: &TokenServiceConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        // aud, iss and nbf are ordinary custom claims here
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl SignedTokenCodec for JwtTokenCodec {
    fn encode(&self, params: &TokenParameters) -> Result<String, DomainError> {
        let claims = Claims::from_parameters(params);
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    fn decode(&self, token: &str) -> Result<DecodedToken, DomainError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken,
            };
            DomainError::Token(kind)
        })?;

        Ok(DecodedToken::try_from(data.claims)?)
    }
}
