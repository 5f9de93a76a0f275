// Not every test file uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use rtransfer::clients::{
    catalog::{
        AddItemsStatus, CatalogPage, DestinationCatalog, SearchFilter, SearchResult,
        SourceCatalog, SourcePlaylist, SourceTrack,
    },
    errors::{Error, Result},
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn page<T>(items: Vec<T>, has_next: bool) -> CatalogPage<T> {
    CatalogPage {
        items,
        next: has_next.then(|| "https://api.example/next".to_string()),
    }
}

pub fn source_playlist(id: &str, name: &str) -> SourcePlaylist {
    SourcePlaylist {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
    }
}

pub fn source_track(name: &str, artist: &str, album: &str) -> Option<SourceTrack> {
    Some(SourceTrack {
        name: Some(name.to_string()),
        artists: vec![artist.to_string()],
        album: Some(album.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Playlists { limit: u32, offset: u32 },
    Items { playlist_id: String, limit: u32, offset: u32 },
}

/// Source catalog serving canned pages. A page index is `offset / limit`.
#[derive(Default)]
pub struct FakeSource {
    pub playlist_pages: Vec<CatalogPage<SourcePlaylist>>,
    pub playlist_failure_at: Option<usize>,
    pub track_pages: HashMap<String, Vec<CatalogPage<Option<SourceTrack>>>>,
    pub track_failure_at: HashMap<String, usize>,
    pub calls: Mutex<Vec<SourceCall>>,
}

impl FakeSource {
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceCatalog for FakeSource {
    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<SourcePlaylist>> {
        self.calls
            .lock()
            .unwrap()
            .push(SourceCall::Playlists { limit, offset });
        let index = (offset / limit) as usize;
        if self.playlist_failure_at == Some(index) {
            return Err(Error::ParseError("simulated playlist listing failure".into()));
        }
        Ok(self.playlist_pages.get(index).cloned().unwrap_or_default())
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<Option<SourceTrack>>> {
        self.calls.lock().unwrap().push(SourceCall::Items {
            playlist_id: playlist_id.to_string(),
            limit,
            offset,
        });
        let index = (offset / limit) as usize;
        if self.track_failure_at.get(playlist_id) == Some(&index) {
            return Err(Error::ParseError("simulated track listing failure".into()));
        }
        Ok(self
            .track_pages
            .get(playlist_id)
            .and_then(|pages| pages.get(index).cloned())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationCall {
    Create { title: String, description: String },
    Search { query: String, filter: SearchFilter, limit: usize },
    Add { playlist_id: String, video_ids: Vec<String> },
}

/// Destination catalog answering searches from per-query tables
pub struct FakeDestination {
    pub songs: HashMap<String, Vec<SearchResult>>,
    pub videos: HashMap<String, Vec<SearchResult>>,
    pub failing_searches: HashSet<String>,
    pub failing_creates: HashSet<String>,
    pub add_status: String,
    pub fail_add: bool,
    pub calls: Mutex<Vec<DestinationCall>>,
}

impl Default for FakeDestination {
    fn default() -> Self {
        FakeDestination {
            songs: HashMap::new(),
            videos: HashMap::new(),
            failing_searches: HashSet::new(),
            failing_creates: HashSet::new(),
            add_status: AddItemsStatus::SUCCEEDED.to_string(),
            fail_add: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeDestination {
    pub fn with_song(mut self, query: &str, video_id: &str) -> Self {
        self.songs
            .insert(query.to_string(), vec![SearchResult::song(video_id)]);
        self
    }

    pub fn with_video(mut self, query: &str, video_id: &str) -> Self {
        self.videos
            .insert(query.to_string(), vec![SearchResult::video(video_id)]);
        self
    }

    pub fn calls(&self) -> Vec<DestinationCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, SearchFilter)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DestinationCall::Search { query, filter, .. } => Some((query, filter)),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DestinationCall::Create { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn adds(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DestinationCall::Add {
                    playlist_id,
                    video_ids,
                } => Some((playlist_id, video_ids)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(DestinationCall::Create {
            title: title.to_string(),
            description: description.to_string(),
        });
        if self.failing_creates.contains(title) {
            return Err(Error::YtMusicUnexpectedResponse("simulated create failure".into()));
        }
        let created = calls
            .iter()
            .filter(|c| matches!(c, DestinationCall::Create { .. }))
            .count();
        Ok(format!("PL{created}"))
    }

    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.calls.lock().unwrap().push(DestinationCall::Search {
            query: query.to_string(),
            filter,
            limit,
        });
        if self.failing_searches.contains(query) {
            return Err(Error::YtMusicUnexpectedResponse("simulated search failure".into()));
        }
        let table = match filter {
            SearchFilter::Songs => &self.songs,
            SearchFilter::Videos => &self.videos,
        };
        Ok(table
            .get(query)
            .map(|r| r.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        video_ids: &[String],
    ) -> Result<AddItemsStatus> {
        self.calls.lock().unwrap().push(DestinationCall::Add {
            playlist_id: playlist_id.to_string(),
            video_ids: video_ids.to_vec(),
        });
        if self.fail_add {
            return Err(Error::YtMusicUnexpectedResponse("simulated add failure".into()));
        }
        Ok(AddItemsStatus {
            status: Some(self.add_status.clone()),
            response: json!({ "status": self.add_status }),
        })
    }
}
