use clap::{Parser, Subcommand};
use log::info;
use rtransfer::clients::{SpotifyClient, YtMusicClient, errors::Result};
use rtransfer::migrator::{self, Migrator};
use rtransfer::pacing::PacingPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rtransfer")]
#[command(version, about = "Transfer playlists from Spotify to YouTube Music", long_about = None)]
struct Cli {
    /// JSON file holding the fetched Spotify playlists
    #[arg(long, global = true, default_value = rtransfer::clients::local_storage::DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// YouTube Music credentials file
    #[arg(long, global = true, default_value = migrator::DEFAULT_OAUTH_FILE)]
    oauth_file: PathBuf,

    /// Skip the delays between YouTube Music calls
    #[arg(long, global = true)]
    no_pacing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-time YouTube Music authorization
    SetupYtmusic {},
    /// Fetch Spotify playlists into the data file
    Fetch {},
    /// Recreate the playlists from the data file on YouTube Music
    Transfer {},
    /// Fetch, save and transfer in one go
    Run {},
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let pacing = if cli.no_pacing {
        PacingPolicy::immediate()
    } else {
        PacingPolicy::default()
    };
    let config = migrator::ConfigBuilder::new()
        .data_file(cli.data_file)
        .oauth_file(cli.oauth_file)
        .pacing(pacing)
        .build();
    let migrator = Migrator::new(config);

    match &cli.command {
        Commands::SetupYtmusic {} => {
            migrator.config().ytmusic_auth().setup_oauth().await?;
        }
        Commands::Fetch {} => {
            let spotify = authorized_spotify().await?;
            let report = migrator.fetch(&spotify).await?;
            println!("Fetched and saved {} playlists.", report.playlists.len());
        }
        Commands::Transfer {} => {
            let ytmusic = connected_ytmusic(&migrator).await?;
            let report = migrator.transfer(&ytmusic).await?;
            println!(
                "Transfer process completed: {} playlists created. Check logs for details on individual playlists and tracks.",
                report.records().len()
            );
        }
        Commands::Run {} => {
            // Check the destination first so a missing setup fails before any fetching
            let ytmusic = connected_ytmusic(&migrator).await?;
            let spotify = authorized_spotify().await?;
            let report = migrator.run(&spotify, &ytmusic).await?;
            println!(
                "Transfer process completed: {} playlists created. Check logs for details on individual playlists and tracks.",
                report.records().len()
            );
        }
    }
    Ok(())
}

async fn authorized_spotify() -> Result<SpotifyClient> {
    info!("Authorizing Spotify client ...");
    let spotify = SpotifyClient::try_default()?;
    // CLI prompt may be shown here
    spotify.authorize_client().await?;
    Ok(spotify)
}

async fn connected_ytmusic(migrator: &Migrator) -> Result<YtMusicClient> {
    info!("Connecting YouTube Music client ...");
    YtMusicClient::connect(migrator.config().ytmusic_auth()).await
}
