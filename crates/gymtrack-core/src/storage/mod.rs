mod config;
pub mod document;

pub use config::{Config, ProfileConfig, StorageConfig};
pub use document::DocumentStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/gymtrack[-dev]/` based on GYMTRACK_ENV.
///
/// Set GYMTRACK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GYMTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("gymtrack-dev")
    } else {
        base_dir.join("gymtrack")
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
