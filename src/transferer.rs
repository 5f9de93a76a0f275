//! Recreates stored playlists on the destination catalog.
//!
//! Each playlist goes through three steps: create it, match its tracks one by one
//! (first song result, otherwise first video result), and add every matched item
//! with a single batch call. A failure only affects the playlist or track it
//! happened on; the run always moves on to the next one.

use log::{debug, error, info, warn};

use crate::clients::{
    catalog::{AddItemsStatus, DestinationCatalog, ResultType, SearchFilter, SearchResult},
    entities::{Playlist, Track, TransferRecord},
    errors::{Error, Result},
    local_storage::LocalStorage,
};
use crate::pacing::{PaceEvent, PacingPolicy};

/// Results requested per search
pub const SEARCH_LIMIT: usize = 5;
pub const UNNAMED_PLAYLIST: &str = "Unnamed Spotify Playlist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Matched {
        video_id: String,
        result_type: ResultType,
    },
    /// Matched an item already queued for this playlist
    Duplicate { video_id: String },
    Unmatched,
    /// Name or artist missing, never searched
    Skipped,
    SearchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReport {
    pub position: usize,
    pub query: Option<String>,
    pub outcome: TrackOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistOutcome {
    CreateFailed(String),
    NoMatches,
    Added(AddItemsStatus),
    AddFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistReport {
    pub name: String,
    pub source_id: String,
    pub destination_id: Option<String>,
    pub tracks: Vec<TrackReport>,
    /// Identifiers sent in the batch add call, in track order
    pub queued: Vec<String>,
    pub outcome: PlaylistOutcome,
}

impl PlaylistReport {
    pub fn record(&self) -> Option<TransferRecord> {
        self.destination_id.as_ref().map(|destination_id| TransferRecord {
            source_id: self.source_id.clone(),
            destination_id: destination_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    pub playlists: Vec<PlaylistReport>,
}

impl TransferReport {
    pub fn records(&self) -> Vec<TransferRecord> {
        self.playlists.iter().filter_map(PlaylistReport::record).collect()
    }

    pub fn matched_tracks(&self) -> usize {
        self.playlists.iter().map(|p| p.queued.len()).sum()
    }

    pub fn unmatched_tracks(&self) -> usize {
        self.playlists
            .iter()
            .flat_map(|p| &p.tracks)
            .filter(|t| matches!(t.outcome, TrackOutcome::Unmatched))
            .count()
    }
}

fn first_valid(results: &[SearchResult], wanted: &ResultType) -> Option<String> {
    results
        .iter()
        .find(|r| &r.result_type == wanted && r.video_id.as_deref().is_some_and(|id| !id.is_empty()))
        .and_then(|r| r.video_id.clone())
}

pub struct Transferer<'a, D: DestinationCatalog + ?Sized> {
    destination: &'a D,
    pacing: PacingPolicy,
}

impl<'a, D: DestinationCatalog + ?Sized> Transferer<'a, D> {
    pub fn new(destination: &'a D, pacing: PacingPolicy) -> Self {
        Transferer {
            destination,
            pacing,
        }
    }

    /// Loads the blob store and transfers its playlists. Fails with `NothingToTransfer`
    /// before any destination call when the store is absent, unreadable or empty.
    pub async fn transfer_from_store(&self, storage: &LocalStorage) -> Result<TransferReport> {
        info!("Starting playlist transfer to YouTube Music from {:?}", storage.path());
        let playlists = storage.load_playlists().await;
        if playlists.is_empty() {
            error!("No Spotify playlist data loaded. Aborting transfer.");
            return Err(Error::NothingToTransfer(storage.path().to_path_buf()));
        }
        info!("Loaded {} playlists from Spotify data file", playlists.len());
        Ok(self.transfer_playlists(&playlists).await)
    }

    pub async fn transfer_playlists(&self, playlists: &[Playlist]) -> TransferReport {
        let mut report = TransferReport::default();
        for playlist in playlists {
            report.playlists.push(self.transfer_playlist(playlist).await);
        }
        info!("Completed transfer process for all playlists");
        report
    }

    async fn transfer_playlist(&self, playlist: &Playlist) -> PlaylistReport {
        let name = if playlist.name.is_empty() {
            UNNAMED_PLAYLIST
        } else {
            playlist.name.as_str()
        };
        let source_id = if playlist.source_id.is_empty() {
            "N/A"
        } else {
            playlist.source_id.as_str()
        };
        info!("Processing Spotify playlist: '{name}' (ID: {source_id})");

        let mut report = PlaylistReport {
            name: name.to_string(),
            source_id: playlist.source_id.clone(),
            destination_id: None,
            tracks: Vec::new(),
            queued: Vec::new(),
            outcome: PlaylistOutcome::NoMatches,
        };

        let description = format!("Migrated from Spotify playlist: {name} (ID: {source_id})");
        let destination_id = match self.destination.create_playlist(name, &description).await {
            Ok(id) => {
                info!("Created YouTube Music playlist '{name}' with ID: {id}");
                self.pacing.pause(PaceEvent::PlaylistCreated).await;
                id
            }
            Err(e) => {
                error!("Failed to create YouTube Music playlist '{name}', skipping it: {e}");
                report.outcome = PlaylistOutcome::CreateFailed(e.to_string());
                self.pacing.pause(PaceEvent::PlaylistCreateFailed).await;
                return report;
            }
        };
        report.destination_id = Some(destination_id.clone());

        info!(
            "Searching for {} tracks from '{name}' on YouTube Music ...",
            playlist.tracks.len()
        );
        for (position, track) in playlist.tracks.iter().enumerate() {
            let track_report = self.match_track(position, track, name, &report.queued).await;
            match &track_report.outcome {
                TrackOutcome::Matched { video_id, .. } => report.queued.push(video_id.clone()),
                TrackOutcome::Duplicate { video_id } => {
                    debug!("  Video ID {video_id} already queued for addition");
                }
                _ => {}
            }
            report.tracks.push(track_report);
        }

        report.outcome = self.populate(&destination_id, name, &report.queued).await;

        info!("Finished processing Spotify playlist: '{name}'");
        self.pacing.pause(PaceEvent::PlaylistFinished).await;
        report
    }

    async fn match_track(
        &self,
        position: usize,
        track: &Track,
        playlist_name: &str,
        queued: &[String],
    ) -> TrackReport {
        let Some(query) = track.search_query() else {
            warn!(
                "Skipping track {} in '{playlist_name}' due to missing name or artist",
                position + 1
            );
            return TrackReport {
                position,
                query: None,
                outcome: TrackOutcome::Skipped,
            };
        };

        debug!("Searching YouTube Music for: '{query}'");
        let outcome = match self.find_match(&query).await {
            Ok(Some((video_id, _))) if queued.contains(&video_id) => {
                TrackOutcome::Duplicate { video_id }
            }
            Ok(Some((video_id, result_type))) => TrackOutcome::Matched {
                video_id,
                result_type,
            },
            Ok(None) => {
                warn!("  Could not find any match for track: '{query}' on YouTube Music");
                TrackOutcome::Unmatched
            }
            Err(e) => {
                error!("Error searching for track '{query}': {e}");
                TrackOutcome::SearchFailed(e.to_string())
            }
        };
        self.pacing.pause(PaceEvent::TrackSearched).await;

        TrackReport {
            position,
            query: Some(query),
            outcome,
        }
    }

    /// First song result with an identifier, otherwise first video result with one
    pub async fn find_match(&self, query: &str) -> Result<Option<(String, ResultType)>> {
        let songs = self
            .destination
            .search(query, SearchFilter::Songs, SEARCH_LIMIT)
            .await?;
        if let Some(video_id) = first_valid(&songs, &ResultType::Song) {
            info!("  Found song match for '{query}': Video ID {video_id}");
            return Ok(Some((video_id, ResultType::Song)));
        }

        warn!("  No direct song match for '{query}'. Trying video search ...");
        self.pacing.pause(PaceEvent::VideoFallback).await;
        let videos = self
            .destination
            .search(query, SearchFilter::Videos, SEARCH_LIMIT)
            .await?;
        if let Some(video_id) = first_valid(&videos, &ResultType::Video) {
            info!("  Found video match for '{query}': Video ID {video_id}");
            return Ok(Some((video_id, ResultType::Video)));
        }
        Ok(None)
    }

    async fn populate(&self, playlist_id: &str, name: &str, video_ids: &[String]) -> PlaylistOutcome {
        if video_ids.is_empty() {
            info!("No tracks were matched for YouTube Music playlist '{name}'");
            return PlaylistOutcome::NoMatches;
        }

        info!(
            "Adding {} tracks to YouTube Music playlist '{name}' (ID: {playlist_id}) ...",
            video_ids.len()
        );
        match self.destination.add_playlist_items(playlist_id, video_ids).await {
            Ok(status) => {
                info!("API response for adding tracks to '{name}': {:?}", status.status);
                if status.succeeded() {
                    info!("Successfully added tracks to playlist '{name}'");
                } else {
                    warn!(
                        "Potential issue adding tracks to '{name}'. Response: {}",
                        status.response
                    );
                }
                PlaylistOutcome::Added(status)
            }
            Err(e) => {
                error!("Failed to add tracks to YouTube Music playlist '{name}' (ID: {playlist_id}): {e}");
                PlaylistOutcome::AddFailed(e.to_string())
            }
        }
    }
}
