//! Runs the fetch, store and transfer stages in order.

use log::{error, info};
use std::path::PathBuf;

use crate::clients::{
    catalog::{DestinationCatalog, SourceCatalog},
    errors::{Error, Result},
    local_storage::{DEFAULT_DATA_FILE, LocalStorage},
    ytmusic_auth::YtMusicAuth,
};
use crate::fetcher::{FetchReport, Fetcher};
use crate::pacing::PacingPolicy;
use crate::transferer::{TransferReport, Transferer};

/// Destination credentials file used when no path is given
pub const DEFAULT_OAUTH_FILE: &str = "oauth.json";

/// Configuration for the Migrator struct
pub struct Config {
    pub storage: LocalStorage,
    pub oauth_file: PathBuf,
    pub pacing: PacingPolicy,
}

impl Config {
    /// OAuth client id and secret are read from the environment only once a setup or
    /// token refresh needs them.
    pub fn ytmusic_auth(&self) -> YtMusicAuth {
        YtMusicAuth::new(self.oauth_file.clone())
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    data_file: Option<PathBuf>,
    oauth_file: Option<PathBuf>,
    pacing: Option<PacingPolicy>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn oauth_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.oauth_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub fn build(self) -> Config {
        Config {
            storage: LocalStorage::new(
                self.data_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            ),
            oauth_file: self
                .oauth_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OAUTH_FILE)),
            pacing: self.pacing.unwrap_or_default(),
        }
    }
}

// Sequences the stages. Each stage finishes before the next one starts.
pub struct Migrator {
    config: Config,
}

impl Migrator {
    pub fn new(config: Config) -> Self {
        Migrator { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every playlist from the source and saves the kept ones to the blob store.
    pub async fn fetch<S: SourceCatalog + ?Sized>(&self, source: &S) -> Result<FetchReport> {
        info!("Step 1/3: Fetching playlists from Spotify ...");
        let report = Fetcher::new(source).fetch_playlists().await;
        if report.playlists.is_empty() {
            error!("Failed to fetch any playlists from Spotify");
            return Err(Error::NothingFetched);
        }
        info!("Fetched {} playlists from Spotify", report.playlists.len());

        info!("Step 2/3: Saving Spotify data to {:?} ...", self.config.storage.path());
        // A failed save ends the migration here, so `run` never transfers a stale document
        if let Err(e) = self.config.storage.save_playlists(&report.playlists).await {
            error!(
                "Error writing to file {:?}, previous data left untouched: {e}",
                self.config.storage.path()
            );
            return Err(e);
        }
        Ok(report)
    }

    /// Recreates the stored playlists on the destination.
    pub async fn transfer<D: DestinationCatalog + ?Sized>(
        &self,
        destination: &D,
    ) -> Result<TransferReport> {
        info!("Step 3/3: Transferring playlists to YouTube Music ...");
        let report = Transferer::new(destination, self.config.pacing.clone())
            .transfer_from_store(&self.config.storage)
            .await?;
        info!(
            "Transfer finished: {} playlists created, {} tracks matched, {} unmatched",
            report.records().len(),
            report.matched_tracks(),
            report.unmatched_tracks()
        );
        Ok(report)
    }

    pub async fn run<S, D>(&self, source: &S, destination: &D) -> Result<TransferReport>
    where
        S: SourceCatalog + ?Sized,
        D: DestinationCatalog + ?Sized,
    {
        self.fetch(source).await?;
        self.transfer(destination).await
    }
}
