//! Songbot - announce what your media player is playing on IRC.
//!
//! Songbot follows one MPRIS media player on the D-Bus session bus and
//! posts a `/me is now playing: <artist> - <title>` action to one IRC
//! channel whenever the track changes, at most once every five minutes.
//!
//! Any fatal condition (player gone, connection refused or lost) stops the
//! process after a short grace delay; restarting is left to a supervisor.
//!
//! # Components
//!
//! - [`bridge::RateLimiter`] decides whether an announcement may go out
//! - [`bridge::NotificationBridge`] turns track changes into announcements
//! - [`services::irc::ChannelSession`] owns the IRC connection
//! - [`shutdown::ShutdownSignal`] carries fatal conditions to the event loop

/// Startup and wiring of all components.
pub mod app;

/// Track change to announcement bridge.
pub mod bridge;

/// Command-line interface definition.
pub mod cli;

/// Configuration file loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// The event loop.
pub mod runtime;

/// Media player and IRC services.
pub mod services;

/// Cooperative shutdown signalling.
pub mod shutdown;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{Result, SongbotError};
