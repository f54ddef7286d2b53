use std::path::PathBuf;

use clap::Parser;

/// Announce the tracks your media player plays in an IRC channel.
///
/// Announcements are limited to one every five minutes.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "songbot", version)]
pub struct Cli {
    /// IRC server host name
    pub network: String,

    /// IRC server port
    pub port: u16,

    /// Channel to announce in ('#' is added when missing)
    pub channel: String,

    /// Nickname to use
    pub nick: String,

    /// Log debug detail instead of errors only
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/songbot/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
