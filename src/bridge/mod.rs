//! Turns player track changes into channel announcements.
//!
//! For every change the bridge asks the player what is playing, checks
//! the [`RateLimiter`], and hands the formatted text to a
//! [`NotificationSink`]. A player that cannot answer is fatal.

/// Announcement text
pub mod format;
/// Debounce policy and clocks
pub mod rate_limit;

#[cfg(test)]
mod tests;

pub use format::{ANNOUNCEMENT_PREFIX, format_announcement};
pub use rate_limit::{Clock, DEFAULT_COOLDOWN, RateLimiter, SystemClock, Timestamp};

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use crate::{
    services::player::{MetadataError, MetadataSource, TrackChanged, TrackInfo},
    shutdown::{ShutdownReason, ShutdownSignal},
};

/// Destination of announcements.
#[async_trait]
pub trait NotificationSink: Send {
    /// Deliver `text`. Delivery problems are the sink's own business.
    async fn send(&mut self, text: &str);
}

/// What handling one track change led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The announcement was handed to the sink
    Announced(String),
    /// Inside the cooldown window; dropped
    RateLimited,
    /// Metadata could not be fetched; shutdown was triggered
    Failed,
    /// Shutdown is already under way; the change was not looked at
    Ignored,
}

/// Bridge between a metadata source and a notification sink.
pub struct NotificationBridge<M, C = SystemClock> {
    source: M,
    clock: C,
    limiter: RateLimiter,
    shutdown: ShutdownSignal,
}

impl<M: MetadataSource> NotificationBridge<M> {
    /// Bridge reading the wall clock, with the default cooldown.
    pub fn new(source: M, shutdown: ShutdownSignal) -> Self {
        Self::with_clock(source, SystemClock, shutdown)
    }
}

impl<M, C> NotificationBridge<M, C>
where
    M: MetadataSource,
    C: Clock,
{
    /// Bridge reading time from `clock`, with the default cooldown.
    pub fn with_clock(source: M, clock: C, shutdown: ShutdownSignal) -> Self {
        Self {
            source,
            clock,
            limiter: RateLimiter::default(),
            shutdown,
        }
    }

    /// Replace the cooldown window.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.limiter = RateLimiter::new(cooldown);
        self
    }

    /// The metadata source the bridge queries.
    pub fn source(&self) -> &M {
        &self.source
    }

    /// Handle one track change.
    ///
    /// Must be awaited to completion before the next change is handled.
    #[instrument(skip_all, fields(uri = ?event.uri))]
    pub async fn on_track_changed<S>(&mut self, event: TrackChanged, sink: &mut S) -> BridgeOutcome
    where
        S: NotificationSink + ?Sized,
    {
        if self.shutdown.is_triggered() {
            debug!("Shutting down, ignoring track change");
            return BridgeOutcome::Ignored;
        }

        let track = match self.fetch_track().await {
            Ok(track) => track,
            Err(e) => {
                error!("Could not access media player, closing: {e}");
                self.shutdown.trigger(ShutdownReason::MetadataUnavailable);
                return BridgeOutcome::Failed;
            }
        };

        if !self.limiter.allow(self.clock.now()) {
            debug!(artist = %track.artist, title = %track.title, "Rate limited");
            return BridgeOutcome::RateLimited;
        }

        let text = format_announcement(&track);
        info!("/me {text}");
        sink.send(&text).await;

        BridgeOutcome::Announced(text)
    }

    async fn fetch_track(&self) -> Result<TrackInfo, MetadataError> {
        let uri = self.source.current_track_uri().await?;
        self.source.track_properties(&uri).await
    }
}
