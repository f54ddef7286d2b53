use tracing::{info, instrument, warn};

use crate::{
    Result,
    bridge::NotificationBridge,
    cli::Cli,
    config::BotConfig,
    runtime,
    services::{
        irc::{ChannelSession, SessionConfig, SessionError},
        player::{MetadataSource, MprisSource},
    },
    shutdown::{SHUTDOWN_GRACE, ShutdownReason, ShutdownSignal},
};

/// Start songbot and run it until it shuts down.
///
/// Returns the shutdown reason on an orderly stop.
///
/// # Errors
/// Returns error for startup failures: unreachable player, unresolvable
/// host. Nothing has been announced when these occur. Ctrl-C during
/// either connect stops startup cleanly.
#[instrument(skip_all, fields(network = %cli.network, port = cli.port))]
pub async fn launch(cli: &Cli, config: &BotConfig) -> Result<ShutdownReason> {
    let shutdown = ShutdownSignal::new();
    watch_interrupt(shutdown.clone());

    let source = match unless_shutdown(&shutdown, MprisSource::connect(&config.player)).await {
        Some(source) => source?,
        None => return Ok(stopped(&shutdown)),
    };
    info!(player = source.identity(), "Media player found");
    let changes = source.track_changes().await?;
    let bridge = NotificationBridge::new(source, shutdown.clone());

    let session_config = SessionConfig {
        channel: cli.channel.clone(),
        nickname: cli.nick.clone(),
        username: config.username.clone(),
        realname: config.realname.clone(),
        password: config.password.clone(),
    };

    let connect = ChannelSession::connect(&cli.network, cli.port, session_config, shutdown.clone());
    let session = match unless_shutdown(&shutdown, connect).await {
        None => return Ok(stopped(&shutdown)),
        Some(Ok(session)) => session,
        Some(Err(e @ SessionError::Resolve { .. })) => return Err(e.into()),
        Some(Err(_)) => return Ok(shutdown.stop_after(SHUTDOWN_GRACE).await),
    };

    Ok(runtime::run(session, bridge, changes, shutdown).await)
}

/// Run `step` unless shutdown is requested first.
///
/// Returns `None` if shutdown won; `step` is dropped unfinished.
async fn unless_shutdown<F: Future>(shutdown: &ShutdownSignal, step: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = shutdown.triggered() => None,
        output = step => Some(output),
    }
}

/// Reason for stopping during startup. Nothing is connected yet, so there
/// is nothing to flush and no grace delay.
fn stopped(shutdown: &ShutdownSignal) -> ShutdownReason {
    let reason = shutdown.reason().unwrap_or(ShutdownReason::Interrupted);
    info!(%reason, "Stopped during startup");
    reason
}

fn watch_interrupt(shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted");
                shutdown.trigger(ShutdownReason::Interrupted);
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });
}
