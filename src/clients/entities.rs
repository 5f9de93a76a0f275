use serde::{Deserialize, Deserializer, Serialize};

// Hand-edited documents may carry `null` where a string is expected
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Track {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artist: String, // first listed artist only
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album: String,
}

impl Track {
    pub fn new(name: impl Into<String>, artist: impl Into<String>, album: impl Into<String>) -> Self {
        Track {
            name: name.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }

    /// Query sent to the destination search, `None` when name or artist is missing
    pub fn search_query(&self) -> Option<String> {
        let name = self.name.trim();
        let artist = self.artist.trim();
        if name.is_empty() || artist.is_empty() {
            return None;
        }
        Some(format!("{name} {artist}"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "id", default, deserialize_with = "null_as_empty")]
    pub source_id: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Links a stored playlist to the playlist created for it on the destination.
/// Only lives for the duration of a transfer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub source_id: String,
    pub destination_id: String,
}
