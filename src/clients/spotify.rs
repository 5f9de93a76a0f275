use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;

use crate::clients::{
    catalog::{CatalogPage, SourceCatalog, SourcePlaylist, SourceTrack},
    errors::{Error, Result},
};
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    model::{FullTrack, PlayableItem, PlaylistId, PlaylistItem, SimplifiedPlaylist},
    prelude::*,
    scopes,
};

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl From<SimplifiedPlaylist> for SourcePlaylist {
    fn from(p: SimplifiedPlaylist) -> SourcePlaylist {
        SourcePlaylist {
            id: non_empty(p.id.id().to_string()),
            name: non_empty(p.name),
        }
    }
}

impl From<FullTrack> for SourceTrack {
    fn from(t: FullTrack) -> SourceTrack {
        SourceTrack {
            name: non_empty(t.name),
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            album: non_empty(t.album.name),
        }
    }
}

fn source_track(item: PlaylistItem) -> Option<SourceTrack> {
    match item.track {
        Some(PlayableItem::Track(track)) => Some(SourceTrack::from(track)),
        _ => None,
    }
}

pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    // Authorize the Spotify client via CLI prompt and OAuth flow
    // This function requires the `cli` feature enabled.
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        self.spotify.prompt_for_token(&url).await?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    // Create a SpotifyClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let creds = Credentials::from_env()
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify credentials in environment variables. Set RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET.".into()))?;
        let oauth = OAuth::from_env(scopes!("playlist-read-private", "playlist-read-collaborative"))
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify OAuth configuration in environment variables. Set RSPOTIFY_REDIRECT_URI.".into()))?;

        let cache_path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".rtransfer_spotify_cache");

        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                cache_path,
                ..Default::default()
            },
        );

        Ok(Self { spotify })
    }
}

#[async_trait]
impl SourceCatalog for SpotifyClient {
    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<SourcePlaylist>> {
        let page = self
            .spotify
            .current_user_playlists_manual(Some(limit), Some(offset))
            .await?;
        Ok(CatalogPage {
            items: page.items.into_iter().map(SourcePlaylist::from).collect(),
            next: page.next,
        })
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage<Option<SourceTrack>>> {
        let id = PlaylistId::from_id(playlist_id)
            .map_err(|e| Error::ParseError(format!("invalid playlist id {playlist_id}: {e}")))?;
        let page = self
            .spotify
            .playlist_items_manual(id, None, None, Some(limit), Some(offset))
            .await?;
        Ok(CatalogPage {
            items: page.items.into_iter().map(source_track).collect(),
            next: page.next,
        })
    }
}
