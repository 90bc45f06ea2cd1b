//! Console rendering of download progress
//!
//! On a terminal each job gets an indicatif bar with status lines printed
//! above it, and a spinner runs while a listing is paginated. With `--quiet`
//! or when stdout is not a terminal the same events become plain lines.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::orchestrator::progress::describe;
use crate::app::{ProgressEvent, ProgressSink};

/// How progress is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Bars and spinners
    Bars,
    /// One line per event
    Plain,
}

impl DisplayMode {
    /// Bars on an interactive stdout unless quiet output was asked for
    pub fn detect(quiet: bool) -> Self {
        if quiet || !atty::is(atty::Stream::Stdout) {
            DisplayMode::Plain
        } else {
            DisplayMode::Bars
        }
    }
}

/// Renders orchestrator events on the console
#[derive(Debug)]
pub struct ConsoleReporter {
    mode: DisplayMode,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    /// Create a reporter in the given mode
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            bar: Mutex::new(None),
        }
    }

    /// Display mode in use
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    fn spinner(message: String) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn job_bar(total: usize, title: &str) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(title.to_string());
        bar
    }

    /// Replace the active bar, clearing the previous one
    fn replace_bar(&self, next: Option<ProgressBar>) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            *slot = next;
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                f(bar);
            }
        }
    }

    /// Print a line above the active bar, or plainly when there is none
    fn line(&self, text: String) {
        let mut printed = false;
        self.with_bar(|bar| {
            bar.println(&text);
            printed = true;
        });
        if !printed {
            println!("{}", text);
        }
    }

    fn on_bar_event(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::ListingStarted { job } => {
                self.replace_bar(Some(Self::spinner(format!(
                    "Listing {}...",
                    job.folder_name()
                ))));
            }
            ProgressEvent::ListingFinished { .. } => {
                self.replace_bar(None);
                println!("{}", listing_line(event));
            }
            ProgressEvent::JobStarted { job, total } => {
                self.replace_bar(Some(Self::job_bar(*total, &job.title)));
            }
            ProgressEvent::TrackSkipped { .. } => self.with_bar(|bar| bar.inc(1)),
            ProgressEvent::TrackStarted { file_name, .. } => {
                let file_name = file_name.to_string();
                self.with_bar(|bar| bar.set_message(file_name));
            }
            ProgressEvent::Resting { duration } => {
                let message = format!("resting {}s", duration.as_secs());
                self.with_bar(|bar| bar.set_message(message));
            }
            ProgressEvent::TrackFinished { .. } => {
                self.line(describe(event));
                self.with_bar(|bar| bar.inc(1));
            }
            ProgressEvent::JobFinished { .. } => {
                self.replace_bar(None);
                println!("{}", job_line(event));
            }
            ProgressEvent::CollectionPause { .. } => println!("{}", describe(event)),
        }
    }

    fn on_plain_event(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::ListingStarted { .. } | ProgressEvent::TrackStarted { .. } => {}
            ProgressEvent::TrackSkipped { .. } => {}
            ProgressEvent::ListingFinished { .. } => println!("{}", listing_line(event)),
            ProgressEvent::JobFinished { .. } => println!("{}", job_line(event)),
            _ => println!("{}", describe(event)),
        }
    }
}

impl ProgressSink for ConsoleReporter {
    fn on_event(&self, event: &ProgressEvent<'_>) {
        match self.mode {
            DisplayMode::Bars => self.on_bar_event(event),
            DisplayMode::Plain => self.on_plain_event(event),
        }
    }
}

/// Listing result as shown to the operator
fn listing_line(event: &ProgressEvent<'_>) -> String {
    match event {
        ProgressEvent::ListingFinished { job, tracks, stop } if stop.is_complete() => {
            format!("{}: {} tracks", job.folder_name(), tracks)
        }
        ProgressEvent::ListingFinished { job, tracks, stop } => format!(
            "{}: {} tracks (listing incomplete: {})",
            job.folder_name(),
            tracks,
            stop
        ),
        other => describe(other),
    }
}

/// Per-job closing line
fn job_line(event: &ProgressEvent<'_>) -> String {
    match event {
        ProgressEvent::JobFinished { report } => {
            let counts = report.counts();
            format!(
                "Finished '{}': {} downloaded, {} already present, {} no access, {} no link, {} failed",
                report.title,
                counts.downloaded,
                counts.skipped,
                counts.no_access,
                counts.no_link,
                counts.failed()
            )
        }
        other => describe(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{DownloadJob, JobReport, StopReason, TrackOutcome, TrackReport};
    use std::path::Path;
    use url::Url;

    fn job() -> DownloadJob {
        DownloadJob::playlist(
            Path::new("downloads"),
            &Url::parse("https://zvuk.com").unwrap(),
            "7",
            "Mix",
        )
    }

    #[test]
    fn test_quiet_forces_plain() {
        assert_eq!(DisplayMode::detect(true), DisplayMode::Plain);
    }

    #[test]
    fn test_listing_line_mentions_incomplete_stop() {
        let job = job();
        let complete = StopReason::Exhausted;
        let failed = StopReason::Failed("timeout".to_string());

        let line = listing_line(&ProgressEvent::ListingFinished {
            job: &job,
            tracks: 12,
            stop: &complete,
        });
        assert_eq!(line, "Mix [7]: 12 tracks");

        let line = listing_line(&ProgressEvent::ListingFinished {
            job: &job,
            tracks: 3,
            stop: &failed,
        });
        assert!(line.starts_with("Mix [7]: 3 tracks (listing incomplete"));
    }

    #[test]
    fn test_job_line_counts() {
        let job = job();
        let report = JobReport {
            kind: job.kind,
            source_id: job.source_id.clone(),
            title: job.title.clone(),
            destination: job.destination.clone(),
            listed: 2,
            listing_stop: StopReason::Exhausted,
            tracks: vec![
                TrackReport {
                    position: 1,
                    track_id: "1".to_string(),
                    file_name: "A - One.mp3".to_string(),
                    outcome: TrackOutcome::Downloaded { bytes: 10 },
                },
                TrackReport {
                    position: 2,
                    track_id: "2".to_string(),
                    file_name: "A - Two.mp3".to_string(),
                    outcome: TrackOutcome::HttpError(403),
                },
            ],
        };

        let line = job_line(&ProgressEvent::JobFinished { report: &report });
        assert_eq!(
            line,
            "Finished 'Mix': 1 downloaded, 0 already present, 0 no access, 0 no link, 1 failed"
        );
    }

    #[test]
    fn test_plain_reporter_has_no_bar() {
        let reporter = ConsoleReporter::new(DisplayMode::Plain);
        let job = job();
        reporter.on_event(&ProgressEvent::JobStarted { job: &job, total: 3 });
        assert!(reporter.bar.lock().unwrap().is_none());
        assert_eq!(reporter.mode(), DisplayMode::Plain);
    }
}
