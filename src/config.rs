use crate::core::db::driver::ConnectParams;
use crate::core::{Result, SessionError};
use crate::session::settings::{RawMode, Settings, DEFAULT_HISTORY_CAPACITY};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub session: Option<SessionConfig>,
    pub raw: Option<RawConfig>,
    /// Defaults for startup connections and `/connect`
    pub connection: Option<ConnectParams>,
}

/// Session-related configuration.
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    pub prompt: Option<String>,
    pub history_capacity: Option<usize>,
    pub nested_field_prefix: Option<String>,
}

/// Raw output configuration.
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub active: Option<bool>,
    pub mode: Option<String>,
}

impl Config {
    /// Settings initialised from this configuration.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        if let Some(session) = &self.session {
            if let Some(prompt) = &session.prompt {
                settings.prompt_template = prompt.clone();
            }
            settings.nested_field_prefix = session.nested_field_prefix.clone();
            settings.history_capacity = match session.history_capacity {
                Some(0) => {
                    return Err(SessionError::Config(
                        "session.history_capacity must be at least 1".to_string(),
                    ))
                }
                Some(capacity) => capacity,
                None => DEFAULT_HISTORY_CAPACITY,
            };
        }
        if let Some(raw) = &self.raw {
            settings.raw_active = raw.active.unwrap_or(false);
            if let Some(mode) = &raw.mode {
                settings.raw_mode = RawMode::from_name(mode);
            }
        }
        Ok(settings)
    }

    pub fn connection_params(&self) -> ConnectParams {
        self.connection.clone().unwrap_or_default()
    }
}

/// Location of the configuration file when none is given explicitly.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlcli").join("config.toml"))
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    debug!("loading configuration from {}", path.display());
    let content = fs::read_to_string(path)
        .map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))?;
    Ok(toml::from_str(&content)?)
}

/// Loads the explicit file, or the default file when it exists.
///
/// A missing default file yields the default configuration.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => load_config(path),
            _ => Ok(Config::default()),
        },
    }
}
