//! # TokenKeeper Core
//!
//! Token lifecycle for the TokenKeeper workspace: creation parameters, the
//! signed token codec, the token storage contract with its in-process
//! implementation, and the stateless and persistent token services.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
