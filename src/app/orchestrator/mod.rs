//! Download orchestration
//!
//! The orchestrator runs download jobs one after another. For each job it
//! drains the listing, then walks the tracks in listing order: skip what is
//! already on disk, pause, resolve a stream, fetch it. Per-track failures
//! become [`TrackOutcome`]s and the job carries on; only filesystem failures
//! on the job folder end the run.
//!
//! Everything is sequential. There is exactly one request or one sleep in
//! flight at any moment.
//!
//! # Architecture
//!
//! - [`config`] - orchestrator settings
//! - [`stats`] - track outcomes, job reports and the run summary
//! - [`progress`] - events for the CLI to render
//! - [`signals`] - interrupt handling around a run
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zvuk_fetcher::app::{
//!     CatalogApi, CatalogClient, ClientConfig, DownloadOrchestrator, MediaDownloader,
//!     OrchestratorConfig, PacingConfig, PacingPolicy, Selection, TaskQueueBuilder,
//! };
//! use zvuk_fetcher::auth::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::from_env()?;
//! let client_config = ClientConfig::default();
//! let catalog = Arc::new(CatalogClient::new(client_config.clone(), &session)?);
//! let fetcher = Arc::new(MediaDownloader::new(&client_config)?);
//!
//! let collections = catalog.list_collections().await?;
//! let jobs = TaskQueueBuilder::new("downloads", client_config.parsed_base_url()?)
//!     .build(&Selection::All, &collections);
//!
//! let mut orchestrator = DownloadOrchestrator::new(
//!     catalog,
//!     fetcher,
//!     PacingPolicy::new(PacingConfig::default()),
//!     OrchestratorConfig::default(),
//! );
//! let summary = orchestrator.run_queue(&jobs).await?;
//! println!("{}", summary.summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod signals;
pub mod stats;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::app::client::{CatalogApi, MediaFetcher};
use crate::app::models::{CollectionKind, Track};
use crate::app::pacing::{pause, PacingPolicy};
use crate::app::pagination::{self, StopReason, Traversal};
use crate::app::paths;
use crate::app::queue::DownloadJob;
use crate::errors::{CatalogError, DownloadError, DownloadResult};

pub use config::OrchestratorConfig;
pub use progress::{NullProgress, ProgressEvent, ProgressSink, RecordingProgress};
pub use signals::{
    create_shutdown_channel, run_until_shutdown, wait_for_signal, ShutdownSignal, SignalHandler,
};
pub use stats::{JobPlan, JobReport, OutcomeCounts, RunSummary, TrackOutcome, TrackReport};

/// Runs download jobs against a catalog and a media fetcher
pub struct DownloadOrchestrator {
    catalog: Arc<dyn CatalogApi>,
    fetcher: Arc<dyn MediaFetcher>,
    pacing: PacingPolicy,
    config: OrchestratorConfig,
    progress: Arc<dyn ProgressSink>,
}

impl DownloadOrchestrator {
    /// Create an orchestrator that reports nowhere
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        fetcher: Arc<dyn MediaFetcher>,
        pacing: PacingPolicy,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            pacing,
            config,
            progress: Arc::new(NullProgress),
        }
    }

    /// Report progress to `sink`
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent<'_>) {
        self.progress.on_event(&event);
    }

    /// Drain the job's listing with the strategy its kind calls for
    pub async fn list_tracks(&self, job: &DownloadJob) -> Traversal<Track> {
        self.emit(ProgressEvent::ListingStarted { job });

        let traversal = match job.kind {
            CollectionKind::Favorites => {
                pagination::favorite_tracks(self.catalog.as_ref(), self.config.pagination).await
            }
            CollectionKind::Playlist => {
                pagination::playlist_tracks(
                    self.catalog.as_ref(),
                    &job.source_id,
                    self.config.pagination,
                )
                .await
            }
        };

        if traversal.stop.is_complete() {
            info!(
                "Listed {} tracks for '{}' in {} page(s)",
                traversal.items.len(),
                job.title,
                traversal.pages
            );
        } else {
            warn!(
                "Listing for '{}' stopped early ({}); continuing with {} tracks",
                job.title,
                traversal.stop,
                traversal.items.len()
            );
        }

        self.emit(ProgressEvent::ListingFinished {
            job,
            tracks: traversal.items.len(),
            stop: &traversal.stop,
        });
        traversal
    }

    /// List a job and count what is still missing, without downloading
    pub async fn plan_job(&self, job: &DownloadJob) -> JobPlan {
        let traversal = self.list_tracks(job).await;
        let pending = traversal
            .items
            .iter()
            .filter(|track| !job.destination.join(paths::track_file_name(track)).exists())
            .count();

        JobPlan {
            title: job.title.clone(),
            destination: job.destination.clone(),
            listed: traversal.items.len(),
            pending,
            listing_stop: traversal.stop,
        }
    }

    /// List and download one job
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Io` if the job folder cannot be created.
    pub async fn process_job(&mut self, job: &DownloadJob) -> DownloadResult<JobReport> {
        let traversal = self.list_tracks(job).await;
        self.run_tracks(job, &traversal.items, traversal.stop.clone())
            .await
    }

    /// Download already-listed tracks into the job folder
    ///
    /// Tracks whose file exists are skipped without any request or pause.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Io` if the job folder cannot be created.
    pub async fn run_job(
        &mut self,
        job: &DownloadJob,
        tracks: &[Track],
    ) -> DownloadResult<JobReport> {
        self.run_tracks(job, tracks, StopReason::Exhausted).await
    }

    async fn run_tracks(
        &mut self,
        job: &DownloadJob,
        tracks: &[Track],
        listing_stop: StopReason,
    ) -> DownloadResult<JobReport> {
        tokio::fs::create_dir_all(&job.destination).await?;

        let total = tracks.len();
        info!(
            "Processing '{}' ({} tracks) into {}",
            job.title,
            total,
            job.destination.display()
        );
        self.emit(ProgressEvent::JobStarted { job, total });

        let mut reports = Vec::with_capacity(total);
        for (index, track) in tracks.iter().enumerate() {
            let position = index + 1;
            let file_name = paths::track_file_name(track);
            let destination = job.destination.join(&file_name);

            let outcome = if destination.exists() {
                debug!("Skipping existing {}", destination.display());
                self.emit(ProgressEvent::TrackSkipped {
                    position,
                    total,
                    file_name: &file_name,
                });
                TrackOutcome::Skipped
            } else {
                self.emit(ProgressEvent::TrackStarted {
                    position,
                    total,
                    file_name: &file_name,
                });
                let outcome = self
                    .download_track(job, position, track, &destination)
                    .await;
                self.emit(ProgressEvent::TrackFinished {
                    position,
                    total,
                    file_name: &file_name,
                    outcome: &outcome,
                });
                outcome
            };

            reports.push(TrackReport {
                position,
                track_id: track.id.clone(),
                file_name,
                outcome,
            });
        }

        let report = JobReport {
            kind: job.kind,
            source_id: job.source_id.clone(),
            title: job.title.clone(),
            destination: job.destination.clone(),
            listed: total,
            listing_stop,
            tracks: reports,
        };
        self.emit(ProgressEvent::JobFinished { report: &report });
        Ok(report)
    }

    /// Run every job in order, pausing between jobs
    ///
    /// # Errors
    ///
    /// Returns the first job-level failure; per-track failures never end the
    /// run.
    pub async fn run_queue(&mut self, jobs: &[DownloadJob]) -> crate::errors::Result<RunSummary> {
        let mut summary = RunSummary::default();
        self.run_queue_into(jobs, &mut summary).await?;
        info!("Run finished: {}", summary.summary());
        Ok(summary)
    }

    /// Like [`run_queue`](Self::run_queue), recording into `summary` as jobs finish
    ///
    /// If the future is dropped part way, `summary` still holds every job
    /// that completed.
    ///
    /// # Errors
    ///
    /// Returns the first job-level failure.
    pub async fn run_queue_into(
        &mut self,
        jobs: &[DownloadJob],
        summary: &mut RunSummary,
    ) -> crate::errors::Result<()> {
        let started = Instant::now();

        for (index, job) in jobs.iter().enumerate() {
            let report = self.process_job(job).await?;
            summary.jobs.push(report);
            summary.duration = started.elapsed();

            if let Some(duration) = self.pacing.collection_delay(index, jobs.len()) {
                if let Some(next) = jobs.get(index + 1) {
                    self.emit(ProgressEvent::CollectionPause { duration, next });
                }
                pause(duration).await;
            }
        }

        summary.duration = started.elapsed();
        Ok(())
    }

    /// Pace, resolve and fetch one track that is not on disk yet
    async fn download_track(
        &mut self,
        job: &DownloadJob,
        position: usize,
        track: &Track,
        destination: &Path,
    ) -> TrackOutcome {
        pause(self.pacing.track_delay()).await;
        if let Some(rest) = self.pacing.rest_delay(position) {
            self.emit(ProgressEvent::Resting { duration: rest });
            pause(rest).await;
        }

        let candidate = match self.catalog.resolve_stream(&track.id, &job.referrer).await {
            Ok(candidate) => candidate,
            Err(CatalogError::StreamUnavailable { .. }) => return TrackOutcome::NoAccess,
            Err(e) if e.is_transport() => {
                warn!("Resolving track {} failed: {}", track.id, e);
                return TrackOutcome::NetworkError(e.to_string());
            }
            Err(e) => {
                debug!("Treating resolution failure for {} as no access: {}", track.id, e);
                return TrackOutcome::NoAccess;
            }
        };

        let Some(url) = candidate.best_url() else {
            return TrackOutcome::NoLink;
        };

        match self
            .fetcher
            .fetch_to_file(url, &job.referrer, destination)
            .await
        {
            Ok(bytes) => TrackOutcome::Downloaded { bytes },
            Err(DownloadError::ServerError { status }) => TrackOutcome::HttpError(status),
            Err(e @ (DownloadError::Http(_) | DownloadError::InvalidUrl { .. })) => {
                warn!("Fetching track {} failed: {}", track.id, e);
                TrackOutcome::NetworkError(e.to_string())
            }
            Err(e @ (DownloadError::Io(_) | DownloadError::AtomicOperationFailed { .. })) => {
                warn!("Writing track {} failed: {}", track.id, e);
                TrackOutcome::WriteError(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for DownloadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("pacing", &self.pacing)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
