use async_trait::async_trait;
use futures::stream::BoxStream;

use super::{MetadataError, TrackChanged, TrackInfo};

/// Ordered stream of track change notifications.
pub type TrackChanges = BoxStream<'static, TrackChanged>;

/// Where songbot learns what is playing.
///
/// The subscription from [`track_changes`](MetadataSource::track_changes)
/// is taken once at startup and consumed by a single handler, which then
/// queries the current track through the other two operations.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// URI of the track currently loaded in the player.
    ///
    /// # Errors
    /// Returns error if the player cannot be reached or has no track
    async fn current_track_uri(&self) -> Result<String, MetadataError>;

    /// Artist and title of the track at `uri`.
    ///
    /// # Errors
    /// Returns error if the player cannot be reached or the metadata lacks
    /// an artist or title
    async fn track_properties(&self, uri: &str) -> Result<TrackInfo, MetadataError>;

    /// Subscribe to track changes.
    ///
    /// # Errors
    /// Returns error if the subscription cannot be set up
    async fn track_changes(&self) -> Result<TrackChanges, MetadataError>;
}
