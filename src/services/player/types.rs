/// Artist and title of the track being played.
///
/// A snapshot taken when a change event is handled; it is not updated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track artist, multiple artists joined with ", "
    pub artist: String,

    /// Track title
    pub title: String,
}

impl TrackInfo {
    /// Create a track snapshot
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// Notification that the player moved to another track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackChanged {
    /// URI reported alongside the change, when the player sent one
    pub uri: Option<String>,
}
