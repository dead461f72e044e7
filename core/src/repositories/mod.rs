pub mod token;

pub use token::{
    DefaultKeySchema, InMemoryTokenStorage, KeySchema, PrefixedKeySchema, SweepResult,
    TokenStorage,
};

#[cfg(test)]
pub use token::MockTokenStorage;
