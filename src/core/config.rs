//! Optional user configuration.
//!
//! A small TOML file under the platform config dir. Everything in it can
//! also be supplied per-invocation; precedence is flag, then environment,
//! then this file, then the platform default.

use crate::core::error::ChatshiftError;
use crate::core::store;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const STORAGE_ROOT_ENV: &str = "CHATSHIFT_STORAGE_ROOT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Overrides the platform-default editor storage root.
    pub storage_root: Option<PathBuf>,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatshift").join("config.toml"))
}

/// Load the config file if present. A missing file is an empty config; a
/// malformed one is an error, not a silent default.
pub fn load() -> Result<Config, ChatshiftError> {
    match config_path() {
        Some(path) if path.is_file() => load_from(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ChatshiftError> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| {
        ChatshiftError::InvalidInput(format!("malformed config {}: {e}", path.display()))
    })
}

/// Resolve the storage root to probe. Existence is checked by discovery,
/// not here.
pub fn resolve_storage_root(
    flag: Option<&Path>,
    config: &Config,
) -> Result<PathBuf, ChatshiftError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_root) = std::env::var(STORAGE_ROOT_ENV) {
        if !env_root.is_empty() {
            return Ok(PathBuf::from(env_root));
        }
    }
    if let Some(path) = &config.storage_root {
        return Ok(path.clone());
    }
    store::default_storage_root().ok_or_else(|| {
        ChatshiftError::InvalidInput(
            "could not determine the editor storage root; pass --storage-root".to_string(),
        )
    })
}
