//! Token service module
//!
//! This module handles all token-related operations:
//! - Signing and verifying tokens through a pluggable codec
//! - Decode-and-project reads (subject, type, claims)
//! - Persistent issuing with one active token per (subject, type)
//! - Invalidation by token value or by identity

mod codec;
mod config;
mod persistent;
mod service;


pub use codec::{JwtTokenCodec, SignedTokenCodec};
pub use config::TokenServiceConfig;
pub use persistent::PersistentTokenService;
pub use service::TokenService;
