use std::collections::HashMap;

use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use super::{MetadataError, TrackInfo};

/// Raw MPRIS `Metadata` property.
pub type MetadataMap = HashMap<String, OwnedValue>;

/// URI identifying the current track.
///
/// Prefers `xesam:url`, falling back to `mpris:trackid` for players that
/// do not expose file locations.
pub fn track_uri(metadata: &MetadataMap) -> Option<String> {
    if let Some(url) = metadata.get("xesam:url") {
        if let Ok(url_str) = String::try_from(url.clone()) {
            if !url_str.is_empty() {
                return Some(url_str);
            }
        }
    }

    if let Some(track_id) = metadata.get("mpris:trackid") {
        if let Ok(path) = OwnedObjectPath::try_from(track_id.clone()) {
            return Some(path.as_str().to_string());
        }
        if let Ok(id_str) = String::try_from(track_id.clone()) {
            return Some(id_str);
        }
    }

    None
}

fn artist(value: &OwnedValue) -> Option<String> {
    if let Ok(array) = <&zbus::zvariant::Array>::try_from(value) {
        let artists: Vec<String> = array
            .iter()
            .filter_map(|artist| {
                if let Ok(s) = artist.downcast_ref::<String>() {
                    Some(s)
                } else if let Ok(s) = artist.downcast_ref::<&str>() {
                    Some(s.to_string())
                } else {
                    None
                }
            })
            .collect();
        if artists.is_empty() {
            None
        } else {
            Some(artists.join(", "))
        }
    } else if let Ok(artist_str) = value.downcast_ref::<String>() {
        Some(artist_str)
    } else if let Ok(artist_str) = value.downcast_ref::<&str>() {
        Some(artist_str.to_string())
    } else {
        None
    }
}

impl TryFrom<&MetadataMap> for TrackInfo {
    type Error = MetadataError;

    fn try_from(metadata: &MetadataMap) -> Result<Self, Self::Error> {
        let artist = metadata
            .get("xesam:artist")
            .and_then(artist)
            .ok_or(MetadataError::MissingField("xesam:artist"))?;

        let title = metadata
            .get("xesam:title")
            .and_then(|title| String::try_from(title.clone()).ok())
            .ok_or(MetadataError::MissingField("xesam:title"))?;

        Ok(Self { artist, title })
    }
}
