//! Domain entities representing issued tokens and their parameters.

pub mod token;


// Re-export commonly used types
pub use token::{
    ClaimMap, Claims, DecodedToken, StoredEntry, TokenParameters, TokenParametersBuilder,
    RESERVED_CLAIMS, TOKEN_TYPE_CLAIM,
};
