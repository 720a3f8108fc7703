//! Core TOML config loading: read from path or platform default.

use crate::schema::ChatbotConfig;
use crate::validation;
use chatbot_common::ConfigError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::template::default_config_toml;

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults. The result is validated and
/// any range violation is returned as `ConfigError::ValidationError`.
pub fn load_from_path(path: &Path) -> Result<ChatbotConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config = parse_str(&content)?;
    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Parse a TOML document without touching the filesystem.
pub fn parse_str(content: &str) -> Result<ChatbotConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
}

/// `<config dir>/chatbot/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("chatbot").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// Write the documented default config to `path`.
///
/// Returns `false` without touching the file if one already exists there,
/// so a server and a CLI starting together never clobber each other's edits.
pub fn create_default_config(path: &Path) -> Result<bool, ConfigError> {
    let write_error =
        |e: std::io::Error| ConfigError::ParseError(format!("failed to write {}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(write_error(e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(write_error)?;

    info!("created default config at {}", path.display());
    Ok(true)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/chatbot/config.toml`
/// On Linux: `~/.config/chatbot/config.toml`
///
/// If the file does not exist, a documented default file is written and
/// defaults are returned.
pub fn load_default() -> Result<ChatbotConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            if create_default_config(&path)? {
                Ok(ChatbotConfig::default())
            } else {
                // Another process wrote it in the meantime.
                load_from_path(&path)
            }
        }
        Err(e) => Err(e),
    }
}
