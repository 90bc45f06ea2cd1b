//! Zvuk Fetcher CLI application
//!
//! Command-line interface for downloading the favorites and playlists saved
//! in a Zvuk account, one track at a time.

use std::process;

use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use zvuk_fetcher::cli::{handle_auth, handle_collections, handle_download, Cli, Commands};
use zvuk_fetcher::config::AppConfig;
use zvuk_fetcher::errors::{AppError, Result};

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => {}
        Err(AppError::Interrupted) => {
            eprintln!("Interrupted; rerun the same command to resume");
            process::exit(AppError::Interrupted.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.global.config.is_none() {
        AppConfig::initialize_first_run().await?;
    }
    let config = AppConfig::load(cli.global.config.clone())
        .await?
        .with_destination_root(cli.global.output.clone());

    init_logging(&cli, &config);

    info!("Zvuk Fetcher v{} starting", env!("CARGO_PKG_VERSION"));
    debug!(
        "Downloading into {}",
        config.download.destination_root.display()
    );

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &config, cli.global.quiet).await
        }
        Commands::Collections => {
            info!("Executing collections command");
            handle_collections(&config).await
        }
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, &config).await
        }
    }
}

/// Initialize logging from the verbosity flags, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());

    let mut filter = EnvFilter::from_default_env();
    match format!("zvuk_fetcher={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", level, e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
