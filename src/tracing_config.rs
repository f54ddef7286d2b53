use std::env;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{SongbotError, config::LogFormat};

/// Environment variable that selects the log output format.
pub const LOG_FORMAT_ENV: &str = "SONGBOT_LOG_FORMAT";

/// Default filter directive for the given verbosity.
///
/// Quiet runs only report errors; verbose runs show everything songbot
/// logs at debug level.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "error" }
}

/// Resolve the output format, letting the environment override the config.
pub fn resolve_format(configured: LogFormat) -> LogFormat {
    match env::var(LOG_FORMAT_ENV).ok().as_deref() {
        Some("json") => LogFormat::Json,
        Some("pretty") => LogFormat::Pretty,
        _ => configured,
    }
}

/// Initialize tracing for the bot
///
/// Uses RUST_LOG if set, otherwise the level chosen by the verbose flag.
/// All output goes to stderr, one event per line.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(verbose: bool, format: LogFormat) -> Result<(), SongbotError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match resolve_format(format) {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(verbose)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| SongbotError::Tracing(e.to_string()))
}
