use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, instrument};
use zbus::{Connection, names::OwnedBusName};

use super::{
    MediaPlayer2PlayerProxy, MediaPlayer2Proxy, MetadataError, MetadataSource, TrackChanges,
    TrackInfo, dedupe_by_uri, metadata,
};

/// Metadata source backed by an MPRIS player on the session bus.
pub struct MprisSource {
    player: MediaPlayer2PlayerProxy<'static>,
    identity: String,
}

impl MprisSource {
    /// Connect to the player owning `bus_name`.
    ///
    /// The player must be running: its identity is read once so that an
    /// absent player is reported before songbot joins any channel.
    ///
    /// # Errors
    /// Returns `MetadataError::InitializationFailed` if the session bus or
    /// the player cannot be reached
    #[instrument]
    pub async fn connect(bus_name: &str) -> Result<Self, MetadataError> {
        let connection = Connection::session().await.map_err(|e| {
            MetadataError::InitializationFailed(format!("D-Bus connection failed: {e}"))
        })?;

        let bus_name = OwnedBusName::try_from(bus_name)
            .map_err(|e| MetadataError::InitializationFailed(format!("Invalid bus name: {e}")))?;

        let base_proxy = MediaPlayer2Proxy::builder(&connection)
            .destination(bus_name.clone())?
            .build()
            .await?;

        let player = MediaPlayer2PlayerProxy::builder(&connection)
            .destination(bus_name.clone())?
            .build()
            .await?;

        let identity = base_proxy.identity().await.map_err(|e| {
            MetadataError::InitializationFailed(format!("Player {bus_name} not reachable: {e}"))
        })?;

        match player.playback_status().await {
            Ok(status) => info!(%identity, %status, "Watching media player"),
            Err(e) => debug!(%identity, error = %e, "Playback status unavailable"),
        }

        Ok(Self { player, identity })
    }

    /// Human-readable name of the player.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

#[async_trait]
impl MetadataSource for MprisSource {
    async fn current_track_uri(&self) -> Result<String, MetadataError> {
        let metadata = self.player.metadata().await?;
        metadata::track_uri(&metadata).ok_or(MetadataError::NoCurrentTrack)
    }

    async fn track_properties(&self, uri: &str) -> Result<TrackInfo, MetadataError> {
        let metadata = self.player.metadata().await?;

        if metadata::track_uri(&metadata).as_deref() != Some(uri) {
            debug!(uri, "Track changed again before its properties were read");
        }

        TrackInfo::try_from(&metadata)
    }

    async fn track_changes(&self) -> Result<TrackChanges, MetadataError> {
        let changes = self.player.receive_metadata_changed().await;
        let current = self.current_track_uri().await.ok();

        let uris = changes.then(|change| async move {
            change
                .get()
                .await
                .ok()
                .and_then(|metadata| metadata::track_uri(&metadata))
        });

        Ok(dedupe_by_uri(current, uris))
    }
}
