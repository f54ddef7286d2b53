/// Errors that can occur while reading track metadata from the player
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    /// Failed to initialize the metadata source
    #[error("Failed to initialize media player source: {0}")]
    InitializationFailed(String),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// The player reports no current track
    #[error("Player has no current track")]
    NoCurrentTrack,

    /// A metadata field the announcement needs is absent or of the wrong type
    #[error("Track metadata is missing '{0}'")]
    MissingField(&'static str),
}
