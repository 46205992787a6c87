use std::path::PathBuf;

use anyhow::{Context, Result};

/// Returns the default config path: ~/.config/tailpipe/default.toml
pub fn global_config_path() -> Result<PathBuf> {
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join("tailpipe").join("default.toml"))
}

/// Expand a leading `~` in a user-supplied config path
pub fn expand_config_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
