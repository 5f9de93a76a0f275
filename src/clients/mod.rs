/// Catalog capabilities shared by the source and destination clients
pub mod catalog;
/// Data entities for playlists and tracks
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// JSON blob store for fetched playlists
pub mod local_storage;
/// Spotify API client
pub mod spotify;
/// YouTube Music API client
pub mod ytmusic;
/// YouTube Music credentials and one-time setup
pub mod ytmusic_auth;

pub use catalog::{DestinationCatalog, SourceCatalog};
pub use local_storage::LocalStorage;
pub use spotify::SpotifyClient;
pub use ytmusic::YtMusicClient;
pub use ytmusic_auth::YtMusicAuth;
