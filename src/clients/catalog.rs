use async_trait::async_trait;
use serde_json::Value;

use crate::clients::errors::Result;

/// One page of a paginated listing. `next` is the continuation cursor reported by the API.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> CatalogPage<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTrack {
    pub name: Option<String>,
    pub artists: Vec<String>,
    pub album: Option<String>,
}

/// Read side of a streaming catalog: the current user's playlists and their items.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<SourcePlaylist>>;

    /// Items that are not tracks (episodes, removed entries) come back as `None`.
    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<Option<SourceTrack>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    Songs,
    Videos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultType {
    Song,
    Video,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub result_type: ResultType,
    pub video_id: Option<String>,
}

impl SearchResult {
    pub fn song(video_id: &str) -> Self {
        SearchResult {
            result_type: ResultType::Song,
            video_id: Some(video_id.to_string()),
        }
    }

    pub fn video(video_id: &str) -> Self {
        SearchResult {
            result_type: ResultType::Video,
            video_id: Some(video_id.to_string()),
        }
    }
}

/// Status reported by an add-items call
#[derive(Debug, Clone, PartialEq)]
pub struct AddItemsStatus {
    pub status: Option<String>,
    pub response: Value,
}

impl AddItemsStatus {
    pub const SUCCEEDED: &'static str = "STATUS_SUCCEEDED";

    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some(Self::SUCCEEDED)
    }
}

/// Write side of a streaming catalog
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    /// Returns the identifier of the new playlist
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String>;

    /// Ranked results, at most `limit` of them
    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        video_ids: &[String],
    ) -> Result<AddItemsStatus>;
}
