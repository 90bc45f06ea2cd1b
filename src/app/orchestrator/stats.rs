//! Per-track outcomes and run statistics
//!
//! Every track a job looks at ends in exactly one [`TrackOutcome`]. Job and
//! run reports aggregate those outcomes for the closing summary.

use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::time::Duration;

use crate::app::models::CollectionKind;
use crate::app::pagination::StopReason;

/// What happened to one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Payload written to disk
    Downloaded { bytes: u64 },
    /// File already present; nothing was requested
    Skipped,
    /// The account may not play this track
    NoAccess,
    /// A stream was offered but without any URL
    NoLink,
    /// Media server answered with a non-success status
    HttpError(u16),
    /// Transport failure while resolving or fetching
    NetworkError(String),
    /// Local filesystem failure while writing
    WriteError(String),
}

impl TrackOutcome {
    /// Short status shown after the track name
    pub fn status_text(&self) -> String {
        match self {
            TrackOutcome::Downloaded { .. } => "OK".to_string(),
            TrackOutcome::Skipped => "already downloaded".to_string(),
            TrackOutcome::NoAccess => "no access".to_string(),
            TrackOutcome::NoLink => "no link".to_string(),
            TrackOutcome::HttpError(status) => format!("HTTP {}", status),
            TrackOutcome::NetworkError(message) => format!("network error: {}", message),
            TrackOutcome::WriteError(message) => format!("write error: {}", message),
        }
    }

    /// Whether a file now exists for this track
    pub fn is_present(&self) -> bool {
        matches!(
            self,
            TrackOutcome::Downloaded { .. } | TrackOutcome::Skipped
        )
    }

    /// Whether the transfer was attempted and failed
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TrackOutcome::HttpError(_)
                | TrackOutcome::NetworkError(_)
                | TrackOutcome::WriteError(_)
        )
    }
}

impl fmt::Display for TrackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_text())
    }
}

/// Outcome of one track at its listing position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReport {
    /// 1-based position within the job's listing
    pub position: usize,
    /// Track id
    pub track_id: String,
    /// Sanitized file name
    pub file_name: String,
    /// What happened
    pub outcome: TrackOutcome,
}

/// Outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub downloaded: usize,
    pub skipped: usize,
    pub no_access: usize,
    pub no_link: usize,
    pub http_errors: usize,
    pub network_errors: usize,
    pub write_errors: usize,
    /// Bytes written by successful downloads
    pub bytes: u64,
}

impl OutcomeCounts {
    /// Count one outcome
    pub fn record(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            TrackOutcome::Skipped => self.skipped += 1,
            TrackOutcome::NoAccess => self.no_access += 1,
            TrackOutcome::NoLink => self.no_link += 1,
            TrackOutcome::HttpError(_) => self.http_errors += 1,
            TrackOutcome::NetworkError(_) => self.network_errors += 1,
            TrackOutcome::WriteError(_) => self.write_errors += 1,
        }
    }

    /// Tracks looked at
    pub fn total(&self) -> usize {
        self.downloaded
            + self.skipped
            + self.no_access
            + self.no_link
            + self.http_errors
            + self.network_errors
            + self.write_errors
    }

    /// Attempted transfers that failed
    pub fn failed(&self) -> usize {
        self.http_errors + self.network_errors + self.write_errors
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.no_access += other.no_access;
        self.no_link += other.no_link;
        self.http_errors += other.http_errors;
        self.network_errors += other.network_errors;
        self.write_errors += other.write_errors;
        self.bytes += other.bytes;
    }
}

/// Result of one download job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Collection kind
    pub kind: CollectionKind,
    /// Collection id
    pub source_id: String,
    /// Collection title
    pub title: String,
    /// Folder the tracks went to
    pub destination: PathBuf,
    /// Tracks the listing produced
    pub listed: usize,
    /// How the listing ended
    pub listing_stop: StopReason,
    /// One entry per listed track, in listing order
    pub tracks: Vec<TrackReport>,
}

impl JobReport {
    /// Outcome counters for this job
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for report in &self.tracks {
            counts.record(&report.outcome);
        }
        counts
    }
}

/// Planned work for one job, computed without downloading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    /// Collection title
    pub title: String,
    /// Folder the tracks would go to
    pub destination: PathBuf,
    /// Tracks the listing produced
    pub listed: usize,
    /// Tracks whose file does not exist yet
    pub pending: usize,
    /// How the listing ended
    pub listing_stop: StopReason,
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports in the order the jobs ran
    pub jobs: Vec<JobReport>,
    /// Wall-clock time for the run
    pub duration: Duration,
}

impl RunSummary {
    /// Counters across all jobs
    pub fn totals(&self) -> OutcomeCounts {
        let mut totals = OutcomeCounts::default();
        for job in &self.jobs {
            totals += job.counts();
        }
        totals
    }

    /// Jobs whose listing stopped early
    pub fn incomplete_listings(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| !job.listing_stop.is_complete())
            .count()
    }

    /// One-paragraph summary for the operator
    pub fn summary(&self) -> String {
        let totals = self.totals();
        let mut text = format!(
            "{} job(s) in {}: {} downloaded ({}), {} already present, {} no access, {} no link, {} failed",
            self.jobs.len(),
            format_duration(self.duration),
            totals.downloaded,
            format_bytes(totals.bytes),
            totals.skipped,
            totals.no_access,
            totals.no_link,
            totals.failed(),
        );

        let incomplete = self.incomplete_listings();
        if incomplete > 0 {
            text.push_str(&format!("; {} listing(s) incomplete", incomplete));
        }
        text
    }
}

/// Format a duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        format!("{}m{}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}h{}m", total_secs / 3600, (total_secs % 3600) / 60)
    }
}

/// Format a byte count in binary units
pub fn format_bytes(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < 1024.0 {
        format!("{} B", bytes)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.1} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(position: usize, outcome: TrackOutcome) -> TrackReport {
        TrackReport {
            position,
            track_id: position.to_string(),
            file_name: format!("{}.mp3", position),
            outcome,
        }
    }

    fn job(tracks: Vec<TrackReport>, stop: StopReason) -> JobReport {
        JobReport {
            kind: CollectionKind::Playlist,
            source_id: "1".to_string(),
            title: "A".to_string(),
            destination: PathBuf::from("downloads/A [1]"),
            listed: tracks.len(),
            listing_stop: stop,
            tracks,
        }
    }

    #[test]
    fn test_status_text() {
        assert_eq!(TrackOutcome::Downloaded { bytes: 1 }.status_text(), "OK");
        assert_eq!(TrackOutcome::NoAccess.status_text(), "no access");
        assert_eq!(TrackOutcome::NoLink.status_text(), "no link");
        assert_eq!(TrackOutcome::HttpError(404).status_text(), "HTTP 404");
        assert_eq!(
            TrackOutcome::NetworkError("reset".to_string()).status_text(),
            "network error: reset"
        );
    }

    #[test]
    fn test_outcome_classification() {
        assert!(TrackOutcome::Skipped.is_present());
        assert!(!TrackOutcome::Skipped.is_failure());
        assert!(TrackOutcome::HttpError(500).is_failure());
        assert!(!TrackOutcome::NoAccess.is_failure());
    }

    #[test]
    fn test_counts_across_jobs() {
        let first = job(
            vec![
                report(1, TrackOutcome::Downloaded { bytes: 100 }),
                report(2, TrackOutcome::Skipped),
                report(3, TrackOutcome::NetworkError("x".to_string())),
            ],
            StopReason::Exhausted,
        );
        let second = job(
            vec![
                report(1, TrackOutcome::Downloaded { bytes: 50 }),
                report(2, TrackOutcome::NoLink),
            ],
            StopReason::Failed("timeout".to_string()),
        );

        let summary = RunSummary {
            jobs: vec![first, second],
            duration: Duration::from_secs(90),
        };
        let totals = summary.totals();

        assert_eq!(totals.downloaded, 2);
        assert_eq!(totals.bytes, 150);
        assert_eq!(totals.skipped, 1);
        assert_eq!(totals.failed(), 1);
        assert_eq!(totals.total(), 5);
        assert_eq!(summary.incomplete_listings(), 1);

        let text = summary.summary();
        assert!(text.starts_with("2 job(s) in 1m30s: 2 downloaded (150 B)"));
        assert!(text.ends_with("1 listing(s) incomplete"));
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h1m");
    }

    #[test]
    fn test_bytes_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
