use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::NavConfig;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "zignav.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read a config file. Every field has a default, so partial files are fine.
pub fn read_config(path: &Path) -> Result<NavConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config the binary runs with.
///
/// An explicit path must exist. Without one, `zignav.toml` in `dir` is used
/// when present and defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<NavConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        read_config(&path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(NavConfig::default())
    }
}
