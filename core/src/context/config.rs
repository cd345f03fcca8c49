//! Tracker configuration loading
//!
//! A single TOML file holds the chat-code routing table, the timer floor,
//! and optional detrimental metadata. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use teast_types::TrackerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> Result<TrackerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: TrackerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        chat_codes = config.chat_codes.len(),
        detrimentals = config.detrimentals.len(),
        "Loaded tracker config"
    );
    Ok(config)
}

/// Like [`load_config`], but a missing file yields defaults. With no path
/// the [`default_config_path`] is tried.
pub fn load_config_or_default(path: Option<&Path>) -> Result<TrackerConfig, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return Ok(TrackerConfig::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No tracker config, using defaults");
        return Ok(TrackerConfig::default());
    }
    load_config(&path)
}

/// Default config location in the user's config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("teast").join("detrimentals.toml"))
}
