//! Configuration management for infrastructure services
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. A TOML file, by default the one named after the current environment
//! 3. `TOKENS__*` environment variables, `__` separating nested keys
//!    (`TOKENS__STORAGE__BACKEND=redis`, `TOKENS__JWT__SECRET=...`)
//!
//! A `.env` file in the working directory is loaded into the process
//! environment first.

use config::{Config, File, FileFormat};
use std::path::Path;

use tk_shared::config::{AppConfig, Environment};

use crate::InfrastructureError;

// Re-export shared configs used by this crate
pub use tk_shared::config::{CacheConfig, MemoryStoreConfig, StorageBackendKind, StorageConfig};

/// Prefix of environment variables read by [`load_config`]
pub const ENV_PREFIX: &str = "TOKENS";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Load the application configuration
///
/// # Arguments
/// * `path` - TOML file to layer over the defaults; when `None`, the
///   environment's own file (`tokenkeeper.<env>.toml`) is used if present
///
/// # Errors
/// * `InfrastructureError::Config` - An explicitly given file is missing, or
///   a source holds values of the wrong shape
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let defaults = Config::try_from(&AppConfig::default()).map_err(config_error)?;

    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => {
            let environment = Environment::from_env();
            tracing::debug!("Looking for optional config file {}", environment.config_file());
            File::with_name(environment.config_file())
                .format(FileFormat::Toml)
                .required(false)
        }
    };

    let config: AppConfig = Config::builder()
        .add_source(defaults)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()
        .map_err(config_error)?
        .try_deserialize()
        .map_err(config_error)?;

    tracing::info!(
        "Loaded {} configuration with {:?} token storage",
        config.environment,
        config.storage.backend
    );
    if config.environment.is_production() && config.jwt.is_using_default_secret() {
        tracing::warn!("Production configuration is using the development JWT secret");
    }

    Ok(config)
}

fn config_error(error: config::ConfigError) -> InfrastructureError {
    InfrastructureError::Config(error.to_string())
}
