use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

use crate::clients::{entities::Playlist, errors::Error};

/// Blob store used when no path is given
pub const DEFAULT_DATA_FILE: &str = "spotify_playlists.json";

/// Renders playlists as an indented, human-readable UTF-8 JSON document
pub fn serialize_playlists(playlists: &[Playlist]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    playlists.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| Error::ParseError(e.to_string()))
}

pub fn deserialize_playlists(contents: &str) -> Result<Vec<Playlist>, Error> {
    Ok(serde_json::from_str(contents)?)
}

/// JSON file holding fetched playlists between the fetch and transfer stages
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Sibling file the document is written to before it replaces the current one
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replaces the stored document. On failure the previous document is left as it was.
    pub async fn save_playlists(&self, playlists: &[Playlist]) -> Result<(), Error> {
        info!("Saving playlist data to {:?} ...", self.path);
        let contents = serialize_playlists(playlists)?;
        let staging = self.staging_path();

        if let Err(e) = tokio::fs::write(&staging, contents).await {
            // Best effort, the staging file may not have been created at all
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(Error::from(e));
        }
        tokio::fs::rename(&staging, &self.path).await?;

        info!("Saved {} playlists to {:?}", playlists.len(), self.path);
        Ok(())
    }

    /// Reads the stored document. `Ok(None)` when there is no document yet.
    pub async fn try_load_playlists(&self) -> Result<Option<Vec<Playlist>>, Error> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let playlists = deserialize_playlists(&contents)?;
        debug!("Loaded {} playlists from {:?}", playlists.len(), self.path);
        Ok(Some(playlists))
    }

    /// Like `try_load_playlists`, but an absent or unreadable document yields no playlists.
    pub async fn load_playlists(&self) -> Vec<Playlist> {
        info!("Loading playlist data from {:?} ...", self.path);
        match self.try_load_playlists().await {
            Ok(Some(playlists)) => {
                info!("Loaded {} playlists from {:?}", playlists.len(), self.path);
                playlists
            }
            Ok(None) => {
                warn!("File {:?} not found, no playlists loaded", self.path);
                Vec::new()
            }
            Err(e) => {
                error!("Failed to load playlists from {:?}: {e}", self.path);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::Track;
    use tempdir::TempDir;

    fn sample() -> Vec<Playlist> {
        vec![
            Playlist {
                name: "Road trip".into(),
                source_id: "37i9dQZF1DX0XUsuxWHRQd".into(),
                tracks: vec![
                    Track::new("Bohemian Rhapsody", "Queen", "A Night at the Opera"),
                    Track::new("99 Luftballons", "Nena", "Nena"),
                ],
            },
            Playlist {
                name: "Ünïcødé ✓".into(),
                source_id: "1".into(),
                tracks: vec![Track::new("Sakura", "Ikimono-gakari", "桜")],
            },
        ]
    }

    #[test]
    fn document_layout_matches_file_format() {
        let text = serialize_playlists(&sample()[1..]).unwrap();
        assert_eq!(
            text,
            "[\n    {\n        \"name\": \"Ünïcødé ✓\",\n        \"id\": \"1\",\n        \"tracks\": [\n            {\n                \"name\": \"Sakura\",\n                \"artist\": \"Ikimono-gakari\",\n                \"album\": \"桜\"\n            }\n        ]\n    }\n]"
        );
    }

    #[test]
    fn serialized_document_reads_back_identically() {
        let playlists = sample();
        let text = serialize_playlists(&playlists).unwrap();
        assert_eq!(deserialize_playlists(&text).unwrap(), playlists);
        assert!(deserialize_playlists(&serialize_playlists(&[]).unwrap()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new("rtransfer").unwrap();
        let storage = LocalStorage::new(dir.path().join("playlists.json"));
        storage.save_playlists(&sample()).await.unwrap();
        assert_eq!(storage.load_playlists().await, sample());
        assert!(!storage.staging_path().exists());
    }

    #[tokio::test]
    async fn absent_file_loads_empty() {
        let dir = TempDir::new("rtransfer").unwrap();
        let storage = LocalStorage::new(dir.path().join("missing.json"));
        assert!(storage.try_load_playlists().await.unwrap().is_none());
        assert!(storage.load_playlists().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let dir = TempDir::new("rtransfer").unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{\"name\": ").unwrap();
        let storage = LocalStorage::new(&path);
        assert!(storage.try_load_playlists().await.is_err());
        assert!(storage.load_playlists().await.is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_document() {
        let dir = TempDir::new("rtransfer").unwrap();
        let path = dir.path().join("playlists.json");
        let storage = LocalStorage::new(&path);
        storage.save_playlists(&sample()).await.unwrap();

        // A directory squatting on the staging path makes the write fail
        std::fs::create_dir(storage.staging_path()).unwrap();
        assert!(storage.save_playlists(&[]).await.is_err());
        assert_eq!(storage.load_playlists().await, sample());
    }
}
