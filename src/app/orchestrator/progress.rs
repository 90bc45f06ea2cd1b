//! Progress events emitted while a run advances
//!
//! The orchestrator never prints. It reports what it is doing through a
//! [`ProgressSink`], and the CLI decides how to render it.

use std::sync::Mutex;
use std::time::Duration;

use crate::app::pagination::StopReason;
use crate::app::queue::DownloadJob;

use super::stats::{JobReport, TrackOutcome};

/// Something the operator may want to see
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    /// Listing of a job's tracks has begun
    ListingStarted { job: &'a DownloadJob },
    /// Listing finished, fully or not
    ListingFinished {
        job: &'a DownloadJob,
        tracks: usize,
        stop: &'a StopReason,
    },
    /// The job's tracks are about to be processed
    JobStarted { job: &'a DownloadJob, total: usize },
    /// Track file already exists
    TrackSkipped {
        position: usize,
        total: usize,
        file_name: &'a str,
    },
    /// Work on a track begins
    TrackStarted {
        position: usize,
        total: usize,
        file_name: &'a str,
    },
    /// An extra rest before this track
    Resting { duration: Duration },
    /// A track reached its outcome
    TrackFinished {
        position: usize,
        total: usize,
        file_name: &'a str,
        outcome: &'a TrackOutcome,
    },
    /// All tracks of the job were processed
    JobFinished { report: &'a JobReport },
    /// Pausing before the next job
    CollectionPause {
        duration: Duration,
        next: &'a DownloadJob,
    },
}

/// Receives progress events
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent<'_>);
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_event(&self, _event: &ProgressEvent<'_>) {}
}

/// Sink that keeps a one-line description of every event
#[derive(Debug, Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_event(&self, event: &ProgressEvent<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(describe(event));
        }
    }
}

/// Plain one-line rendering of an event
pub fn describe(event: &ProgressEvent<'_>) -> String {
    match event {
        ProgressEvent::ListingStarted { job } => format!("listing {}", job.folder_name()),
        ProgressEvent::ListingFinished { job, tracks, stop } => {
            format!("listed {}: {} tracks ({})", job.folder_name(), tracks, stop)
        }
        ProgressEvent::JobStarted { job, total } => {
            format!("job {}: {} tracks", job.folder_name(), total)
        }
        ProgressEvent::TrackSkipped {
            position,
            total,
            file_name,
        } => format!("[{}/{}] {} -> skipped", position, total, file_name),
        ProgressEvent::TrackStarted {
            position,
            total,
            file_name,
        } => format!("[{}/{}] {}", position, total, file_name),
        ProgressEvent::Resting { duration } => format!("rest {}s", duration.as_secs()),
        ProgressEvent::TrackFinished {
            position,
            total,
            file_name,
            outcome,
        } => format!("[{}/{}] {} -> {}", position, total, file_name, outcome),
        ProgressEvent::JobFinished { report } => format!(
            "finished {}: {} downloaded",
            report.title,
            report.counts().downloaded
        ),
        ProgressEvent::CollectionPause { duration, next } => format!(
            "waiting {}s before {}",
            duration.as_secs(),
            next.folder_name()
        ),
    }
}
