//! Rtransfer - Transfer playlists from Spotify to YouTube Music
//!
//! This library reads the current user's Spotify playlists, keeps them in a JSON
//! file, and recreates each one on YouTube Music by searching for every track and
//! adding the best match.

/// Client modules for interacting with external services and local storage
pub mod clients;
/// Source catalog pagination
pub mod fetcher;
/// Three-stage orchestration
pub mod migrator;
/// Delays between destination calls
pub mod pacing;
/// Playlist recreation and track matching
pub mod transferer;
