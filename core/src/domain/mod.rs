//! Domain layer containing the token value types.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
