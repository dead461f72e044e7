pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;
pub mod schema;
pub mod sweeper;

pub use memory::InMemoryTokenStorage;
pub use r#trait::TokenStorage;
pub use schema::{DefaultKeySchema, KeySchema, PrefixedKeySchema};
pub use sweeper::SweepResult;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockTokenStorage;
