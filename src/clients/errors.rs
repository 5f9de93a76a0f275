use std::path::PathBuf;

use rspotify::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse transmit data, error: {0}")]
    ParseError(String),

    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("YouTube Music HTTP error: {0}")]
    YtMusicHttpError(#[from] reqwest::Error),

    #[error("YouTube Music API unexpected response: {0}")]
    YtMusicUnexpectedResponse(String),

    #[error("YouTube Music authorization error: {0}")]
    YtMusicAuthError(String),

    #[error(
        "YouTube Music credentials file {0:?} not found, run `rtransfer setup-ytmusic` first"
    )]
    SetupRequired(PathBuf),

    #[error("No playlist data to transfer in {0:?}")]
    NothingToTransfer(PathBuf),

    #[error("Failed to fetch any playlists from Spotify")]
    NothingFetched,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
