use std::{
    fmt,
    sync::{Arc, OnceLock},
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Delay between a shutdown being triggered and the event loop stopping.
///
/// Leaves time for an in-flight write to reach the server.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Why songbot is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Track metadata could not be fetched from the player
    MetadataUnavailable,

    /// The player's change notifications stopped
    PlayerGone,

    /// The IRC connection or channel join could not be established
    ConnectFailed,

    /// The IRC connection was lost after being established
    ConnectionLost,

    /// The operator asked songbot to stop
    Interrupted,
}

impl ShutdownReason {
    /// Process exit status for this reason.
    ///
    /// Only an operator interrupt counts as success, so a supervisor can
    /// restart songbot after every other fatal condition.
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownReason::Interrupted => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::MetadataUnavailable => write!(f, "metadata unavailable"),
            ShutdownReason::PlayerGone => write!(f, "player gone"),
            ShutdownReason::ConnectFailed => write!(f, "connect failed"),
            ShutdownReason::ConnectionLost => write!(f, "connection lost"),
            ShutdownReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Process-wide cooperative shutdown request.
///
/// Cloned into every component that can hit a fatal condition. The first
/// trigger records its reason and cancels the token; later triggers are
/// ignored, so a shutdown is scheduled at most once.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<ShutdownReason>>,
}

impl ShutdownSignal {
    /// Create a signal that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.
    ///
    /// Returns `true` if this call scheduled the shutdown, `false` if one
    /// was already pending.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if let Err(ignored) = self.reason.set(reason) {
            debug!(%ignored, "Shutdown already scheduled");
            return false;
        }

        info!(%reason, "Shutdown scheduled");
        self.token.cancel();
        true
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason recorded by the first trigger.
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    /// Resolves once shutdown has been requested.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    /// Wait for a shutdown request, then for the grace delay.
    ///
    /// Returns the recorded reason once the process may stop.
    pub async fn stop_after(&self, grace: Duration) -> ShutdownReason {
        self.triggered().await;
        tokio::time::sleep(grace).await;
        self.reason().unwrap_or(ShutdownReason::Interrupted)
    }
}
