//! Token services: signing, decoding and the persistent lifecycle.

pub mod token;

// Re-export commonly used types
pub use token::{
    JwtTokenCodec, PersistentTokenService, SignedTokenCodec, TokenService, TokenServiceConfig,
};
