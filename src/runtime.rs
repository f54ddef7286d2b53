use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info};

use crate::{
    bridge::{Clock, NotificationBridge},
    services::{irc::ChannelSession, player::{MetadataSource, TrackChanges}},
    shutdown::{SHUTDOWN_GRACE, ShutdownReason, ShutdownSignal},
};

/// Message sent with `QUIT` when songbot leaves on its own.
pub const QUIT_MESSAGE: &str = "songbot shutting down";

/// Drive the session and the bridge until shutdown.
///
/// Server lines and track changes are handled one at a time, each to
/// completion, in the order they arrive. Once shutdown is triggered the
/// session quits, the grace delay elapses and the recorded reason is
/// returned.
pub async fn run<S, M, C>(
    mut session: ChannelSession<S>,
    mut bridge: NotificationBridge<M, C>,
    mut changes: TrackChanges,
    shutdown: ShutdownSignal,
) -> ShutdownReason
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    M: MetadataSource,
    C: Clock,
{
    session.register().await;

    loop {
        tokio::select! {
            biased;

            () = shutdown.triggered() => break,

            line = session.next_line(), if session.is_open() => {
                if let Some(line) = line {
                    session.handle_line(&line).await;
                }
            }

            change = changes.next() => match change {
                Some(change) => {
                    let outcome = bridge.on_track_changed(change, &mut session).await;
                    debug!(?outcome, "Track change handled");
                }
                None => {
                    error!("Media player stopped reporting track changes");
                    shutdown.trigger(ShutdownReason::PlayerGone);
                }
            },
        }
    }

    session.quit(QUIT_MESSAGE).await;
    let reason = shutdown.stop_after(SHUTDOWN_GRACE).await;
    info!(%reason, "Stopped");
    reason
}
