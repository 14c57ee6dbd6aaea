//! `.env` file support
//!
//! Values from the file only fill keys the process environment leaves unset.

use anyhow::{Context, Result};
use lapse_core::TimelapseConfig;
use std::collections::HashMap;
use std::path::Path;

/// File read from the working directory at startup
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Reads `KEY=value` pairs from `path`; a missing file yields no pairs
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    match dotenvy::from_path_iter(path) {
        Ok(entries) => entries
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .with_context(|| format!("Malformed env file {}", path.display())),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read env file {}", path.display())),
    }
}

/// Resolves the configuration from `lookup`, falling back to `env_file`
pub fn config_with_env_file<F>(env_file: &Path, lookup: F) -> Result<TimelapseConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = read_env_file(env_file)?;
    if !file.is_empty() {
        log::debug!("Read {} entries from {}", file.len(), env_file.display());
    }
    let config = TimelapseConfig::from_lookup(|key| lookup(key).or_else(|| file.get(key).cloned()))?;
    Ok(config)
}

/// Resolves the configuration from the process environment and `env_file`
pub fn load_config(env_file: &Path) -> Result<TimelapseConfig> {
    config_with_env_file(env_file, |key| std::env::var(key).ok())
}
