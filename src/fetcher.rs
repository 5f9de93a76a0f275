//! Reads the current user's playlists and their tracks from the source catalog.

use log::{debug, error, info, warn};

use crate::clients::{
    catalog::{SourceCatalog, SourcePlaylist, SourceTrack},
    entities::{Playlist, Track},
    errors::Result,
};

/// Largest playlist page the source API serves
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;
/// Largest playlist-items page the source API serves
pub const TRACK_PAGE_LIMIT: u32 = 100;

pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";
pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

impl From<SourceTrack> for Track {
    fn from(t: SourceTrack) -> Track {
        Track {
            name: t.name.unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
            artist: t
                .artists
                .into_iter()
                .next()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: t.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    NoTracks,
    TracksFailed(String),
}

/// A source playlist that was not kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlaylist {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Playlists with at least one fetched track, in source order
    pub playlists: Vec<Playlist>,
    pub skipped: Vec<SkippedPlaylist>,
    /// False when a playlist listing call failed and the fetch stopped early
    pub completed: bool,
}

pub struct Fetcher<'a, S: SourceCatalog + ?Sized> {
    source: &'a S,
}

impl<'a, S: SourceCatalog + ?Sized> Fetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Fetcher { source }
    }

    /// Never fails: a listing error stops the fetch and whatever was collected is returned.
    pub async fn fetch_playlists(&self) -> FetchReport {
        info!("Starting to fetch Spotify playlists ...");
        let mut report = FetchReport::default();

        match self.walk_playlists(&mut report).await {
            Ok(()) => report.completed = true,
            Err(e) => error!("Spotify API error while fetching playlists: {e}"),
        }

        info!(
            "Finished fetching playlists. Kept {} playlists, skipped {}",
            report.playlists.len(),
            report.skipped.len()
        );
        report
    }

    async fn walk_playlists(&self, report: &mut FetchReport) -> Result<()> {
        let mut offset = 0;
        loop {
            debug!("Fetching playlists batch: offset={offset}, limit={PLAYLIST_PAGE_LIMIT}");
            let page = self
                .source
                .current_user_playlists(PLAYLIST_PAGE_LIMIT, offset)
                .await?;
            if page.items.is_empty() {
                warn!("Empty playlists batch received");
                break;
            }

            let has_next = page.has_next();
            for playlist in page.items {
                self.fetch_playlist(playlist, report).await;
            }

            if !has_next {
                debug!("No more pages of playlists");
                break;
            }
            offset += PLAYLIST_PAGE_LIMIT;
        }
        Ok(())
    }

    async fn fetch_playlist(&self, playlist: SourcePlaylist, report: &mut FetchReport) {
        let name = playlist
            .name
            .unwrap_or_else(|| UNKNOWN_PLAYLIST.to_string());
        let Some(id) = playlist.id else {
            warn!("Skipping playlist '{name}' due to missing ID");
            report.skipped.push(SkippedPlaylist {
                name,
                reason: SkipReason::MissingId,
            });
            return;
        };

        info!("Fetching tracks for playlist: '{name}' (ID: {id})");
        match self.fetch_tracks(&id, &name).await {
            Ok(tracks) if !tracks.is_empty() => {
                info!("Finished fetching {} tracks for playlist '{name}'", tracks.len());
                report.playlists.push(Playlist {
                    name,
                    source_id: id,
                    tracks,
                });
            }
            Ok(_) => {
                info!("No tracks fetched for playlist '{name}'");
                report.skipped.push(SkippedPlaylist {
                    name,
                    reason: SkipReason::NoTracks,
                });
            }
            Err(e) => {
                error!("Error fetching tracks for playlist '{name}' (ID: {id}): {e}");
                report.skipped.push(SkippedPlaylist {
                    name,
                    reason: SkipReason::TracksFailed(e.to_string()),
                });
            }
        }
    }

    // All pages of one playlist; any page failure discards the whole playlist
    async fn fetch_tracks(&self, playlist_id: &str, name: &str) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let mut offset = 0;
        loop {
            debug!("Fetching tracks batch for '{name}': offset={offset}, limit={TRACK_PAGE_LIMIT}");
            let page = self
                .source
                .playlist_items(playlist_id, TRACK_PAGE_LIMIT, offset)
                .await?;
            if page.items.is_empty() {
                debug!("No more tracks found for playlist '{name}'");
                break;
            }

            let has_next = page.has_next();
            for item in page.items {
                match item {
                    Some(source_track) => {
                        let track = Track::from(source_track);
                        debug!("  Added track: {} - {} - {}", track.name, track.artist, track.album);
                        tracks.push(track);
                    }
                    None => warn!("Skipping item in '{name}' - missing track data"),
                }
            }

            if !has_next {
                break;
            }
            offset += TRACK_PAGE_LIMIT;
        }
        Ok(tracks)
    }
}
