use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while reading the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error
    #[error("failed to parse TOML at '{path}': {details}")]
    TomlParse {
        /// Path of the TOML file
        path: PathBuf,
        /// Parse error details
        details: String,
    },
}

impl ConfigError {
    /// Create an I/O error tied to the file it happened on.
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Create a TOML parse error, canonicalising the path when possible.
    pub fn toml_parse(error: impl fmt::Display, path: &Path) -> Self {
        let clean_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::TomlParse {
            path: clean_path,
            details: error.to_string(),
        }
    }
}
