//! Configuration file for songbot.
//!
//! Everything the command line does not cover lives in an optional TOML
//! file. All keys have defaults, so a missing file at the default location
//! simply means "use the defaults".

mod error;
mod log_format;
mod paths;


pub use error::ConfigError;
pub use log_format::LogFormat;
pub use paths::ConfigPaths;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Bus name of the player songbot follows when none is configured.
pub const DEFAULT_PLAYER: &str = "org.mpris.MediaPlayer2.rhythmbox";

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// MPRIS bus name of the media player to follow.
    pub player: String,

    /// IRC username sent with `USER`. Defaults to the nickname.
    pub username: Option<String>,

    /// IRC real name sent with `USER`. Defaults to the nickname.
    pub realname: Option<String>,

    /// Server password sent with `PASS` before registering.
    pub password: Option<String>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            player: DEFAULT_PLAYER.to_string(),
            username: None,
            realname: None,
            password: None,
            log_format: LogFormat::default(),
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// No file; built-in defaults
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "defaults"),
        }
    }
}

impl BotConfig {
    /// Load configuration, honouring an explicit path if one was given.
    ///
    /// Without an explicit path the default location is tried; a missing
    /// file, or no usable config directory at all, yields the defaults. An
    /// explicit path must exist. Runs before logging is set up, so the
    /// source is returned for the caller to report.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid config TOML
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        match explicit {
            Some(path) => Ok((Self::load_from(path)?, ConfigSource::File(path.to_path_buf()))),
            None => Self::load_default(ConfigPaths::main_config()),
        }
    }

    fn load_default(location: io::Result<PathBuf>) -> Result<(Self, ConfigSource), ConfigError> {
        match location {
            Ok(path) if path.exists() => Ok((Self::load_from(&path)?, ConfigSource::File(path))),
            _ => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Parse the config file at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(e, path))?;
        toml::from_str(&content).map_err(|e| ConfigError::toml_parse(e, path))
    }
}
