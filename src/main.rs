use std::{fs::File, sync::Mutex};

use tokio::io::BufReader;
use tracing::{info, instrument, level_filters::LevelFilter};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use api::HttpRecorderApi;
use commands::Console;
use config::Config;
use directory::PlayerDirectory;
use session::GameForm;
use submission::GameSubmitter;

/// Access to the game backend.
mod api;
/// The operator's console.
///
/// Every command the operator can type lives here, grouped by what it touches: the rosters or the
/// game as a whole.
mod commands;
/// Settings read from the environment.
mod config;
/// The registered players fetched from the backend.
mod directory;
/// Operator-facing banners that also go to the log.
mod log;
/// Players, teams and roles.
mod models;
/// The five slots of a team and the edits allowed on them.
mod roster;
/// The game currently being entered.
mod session;
/// Sending finished games to the backend.
mod submission;
/// Checks mirroring what the backend refuses.
mod validation;

/// Error type used wherever a failure only needs to be reported.
pub type RecorderError = anyhow::Error;

#[tokio::main]
async fn main() -> Result<(), RecorderError> {
    // Load the .env file only in the development environment (bypassed with the --release flag)
    #[cfg(debug_assertions)]
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    setup_tracing(&config)?;

    run(config).await
}

/// Fetch the directory, then hand control to the operator until they quit.
async fn run(config: Config) -> Result<(), RecorderError> {
    let mut console = setup(config).await;

    println!("Record a new game. Type `help` for the list of commands.");
    console
        .run(BufReader::new(tokio::io::stdin()), &mut std::io::stdout())
        .await
}

#[instrument(name = "recorder_setup", skip(config), fields(api_url = %config.api_url))]
async fn setup(config: Config) -> Console<HttpRecorderApi> {
    let api = HttpRecorderApi::new(&config.api_url);

    let directory = PlayerDirectory::load(&api).await;
    info!("Directory ready with {} players", directory.len());

    Console::new(
        GameForm::new(directory),
        GameSubmitter::new(api, config.send_timestamp),
        config.strict,
    )
}

/// Sets up the tracing subscriber for the recorder.
fn setup_tracing(config: &Config) -> Result<(), RecorderError> {
    if cfg!(debug_assertions) {
        let filter = EnvFilter::builder()
            .with_default_directive("game_recorder=info".parse()?)
            .from_env_lossy();

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .pretty()
            .init();

        return Ok(());
    }

    let log_file = File::create(&config.log_file)?;

    // Only errors make it to the log file in release builds
    tracing_subscriber::fmt::fmt()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(LevelFilter::ERROR)
        .with_writer(Mutex::new(log_file))
        .pretty()
        .init();

    Ok(())
}
