//! songbot - announce the playing track in an IRC channel.
//!
//! Exits 0 after Ctrl-C, 1 after any fatal condition, so a supervisor can
//! tell a requested stop from a failure.

use std::process;

use clap::Parser;
use songbot::{app, cli::Cli, config::BotConfig, tracing_config};
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let (config, source) = match BotConfig::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("songbot: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = tracing_config::init(cli.verbose, config.log_format) {
        eprintln!("songbot: {e}");
        process::exit(1);
    }
    debug!(%source, "Configuration loaded");

    match app::launch(&cli, &config).await {
        Ok(reason) => process::exit(reason.exit_code()),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
