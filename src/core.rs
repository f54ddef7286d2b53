use thiserror::Error;

use crate::{
    config::ConfigError,
    services::{irc::SessionError, player::MetadataError},
};

/// Errors that abort songbot before or while running its event loop.
#[derive(Error, Debug)]
pub enum SongbotError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The media player could not be reached
    #[error("media player unavailable: {0}")]
    Player(#[from] MetadataError),

    /// The IRC connection could not be established
    #[error("IRC session failed: {0}")]
    Session(#[from] SessionError),

    /// Logging could not be initialised
    #[error("failed to initialise logging: {0}")]
    Tracing(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SongbotError>;
