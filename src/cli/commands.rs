//! Command handlers for Zvuk Fetcher CLI
//!
//! This module implements the command handlers that connect CLI arguments to
//! the catalog client, the task queue and the download orchestrator.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::app::orchestrator::{create_shutdown_channel, run_until_shutdown, SignalHandler};
use crate::app::{
    DownloadJob, DownloadOrchestrator, JobPlan, MediaDownloader, PacingPolicy, RunSummary,
    TaskQueueBuilder,
};
use crate::auth::{
    clear_credentials, setup_credentials, show_auth_status, verify_credentials,
};
use crate::cli::progress::{ConsoleReporter, DisplayMode};
use crate::cli::startup::{connect, load_collections, prompt_selection};
use crate::cli::{AuthAction, AuthArgs, DownloadArgs};
use crate::config::AppConfig;
use crate::constants::selection;
use crate::errors::{AppError, Result};

/// Handle the download command
///
/// Checks the session, lists the saved collections, resolves the selection
/// into jobs and runs them one after another. Ctrl-C is honoured from the
/// first request on, including while the selection prompt waits.
pub async fn handle_download(args: DownloadArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let mut summary = RunSummary::default();
    let result = until_interrupted(download(args, config, quiet, &mut summary)).await;

    if matches!(result, Err(AppError::Interrupted)) && !summary.jobs.is_empty() {
        println!();
        println!("Finished before the interrupt: {}", summary.summary());
    }
    result
}

async fn download(
    args: DownloadArgs,
    config: &AppConfig,
    quiet: bool,
    summary: &mut RunSummary,
) -> Result<()> {
    let start_time = Instant::now();
    let (client_config, pacing_config, orchestrator_config) = config.to_runtime_config();
    orchestrator_config.validate().map_err(AppError::generic)?;

    let selection = args.parsed_selection()?;

    let connection = connect(&client_config).await?;
    println!("Authorized as {}", connection.profile.name);

    let collections = load_collections(connection.client.as_ref()).await;

    let selection = match selection {
        Some(selection) => selection,
        None => prompt_selection(&collections).await?,
    };

    let jobs = TaskQueueBuilder::new(
        orchestrator_config.destination_root.clone(),
        client_config.parsed_base_url()?,
    )
    .build(&selection, &collections);
    info!("Selection '{}' produced {} job(s)", selection, jobs.len());

    let fetcher = Arc::new(MediaDownloader::new(&client_config)?);
    let reporter = Arc::new(ConsoleReporter::new(DisplayMode::detect(quiet)));
    let mut orchestrator = DownloadOrchestrator::new(
        connection.client.clone(),
        fetcher,
        PacingPolicy::new(pacing_config),
        orchestrator_config,
    )
    .with_progress(reporter);

    if args.dry_run {
        let plans = plan_jobs(&orchestrator, &jobs).await?;
        print_plan(&plans);
    } else {
        orchestrator.run_queue_into(&jobs, summary).await?;
        println!();
        println!("{}", summary.summary());
        let failed = summary.totals().failed();
        if failed > 0 {
            warn!("{} track(s) failed; rerun to retry them", failed);
        }
    }

    debug!("Download command finished in {:?}", start_time.elapsed());
    Ok(())
}

/// Race `work` against Ctrl-C and SIGTERM
async fn until_interrupted<F, T>(work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let signal_task = SignalHandler::new(shutdown_tx).setup();
    let result = run_until_shutdown(work, shutdown_rx).await;
    signal_task.abort();
    result
}

/// List every job without downloading
async fn plan_jobs(orchestrator: &DownloadOrchestrator, jobs: &[DownloadJob]) -> Result<Vec<JobPlan>> {
    let mut plans = Vec::with_capacity(jobs.len());
    for job in jobs {
        plans.push(orchestrator.plan_job(job).await);
    }
    Ok(plans)
}

fn print_plan(plans: &[JobPlan]) {
    println!();
    println!("Dry run: nothing will be downloaded");
    println!();

    let mut listed = 0;
    let mut pending = 0;
    for plan in plans {
        let mut line = format!(
            "  {}  {} tracks, {} to download",
            plan.destination.display(),
            plan.listed,
            plan.pending
        );
        if !plan.listing_stop.is_complete() {
            line.push_str(&format!(" (listing incomplete: {})", plan.listing_stop));
        }
        println!("{}", line);
        listed += plan.listed;
        pending += plan.pending;
    }

    println!();
    println!(
        "{} job(s), {} tracks listed, {} to download",
        plans.len(),
        listed,
        pending
    );
}

/// Handle the collections command
pub async fn handle_collections(config: &AppConfig) -> Result<()> {
    until_interrupted(list_collections(config)).await
}

async fn list_collections(config: &AppConfig) -> Result<()> {
    let (client_config, _, _) = config.to_runtime_config();

    let connection = connect(&client_config).await?;
    println!("Authorized as {}", connection.profile.name);

    let collections = load_collections(connection.client.as_ref()).await;

    println!();
    println!("  [{}] {}", selection::FAVORITES, selection::FAVORITES_TITLE);
    for collection in &collections {
        println!("  [{}] {}", collection.id, collection.title);
    }
    println!();
    println!("{} playlist(s)", collections.len());

    Ok(())
}

/// Handle session management commands
pub async fn handle_auth(args: AuthArgs, config: &AppConfig) -> Result<()> {
    let client_config = config.client.to_runtime_config();

    match args.action {
        AuthAction::Setup => setup_credentials(&client_config).await?,
        AuthAction::Verify => match verify_credentials(&client_config).await? {
            Some(name) => println!("Session is valid. Authorized as {}", name),
            None => {
                println!("The server rejected the stored session.");
                println!("Capture the cookies again and run: zvuk_fetcher auth setup");
            }
        },
        AuthAction::Status => show_auth_status(&client_config).await?,
        AuthAction::Clear => {
            clear_credentials()?;
            println!("Stored session removed from .env");
        }
    }

    Ok(())
}
