use crate::services::player::TrackInfo;

/// Text every announcement starts with; sent as an action it reads
/// "* nick is now playing: ...".
pub const ANNOUNCEMENT_PREFIX: &str = "is now playing: ";

/// Format the announcement for `track`.
///
/// Runs of whitespace anywhere in the artist or title collapse to a single
/// space, so tags with stray newlines or tabs still produce one tidy line.
pub fn format_announcement(track: &TrackInfo) -> String {
    let song = format!("{} - {}", track.artist, track.title);
    let song = song.split_whitespace().collect::<Vec<_>>().join(" ");

    format!("{ANNOUNCEMENT_PREFIX}{song}")
}
