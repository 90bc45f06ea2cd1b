//! Core application logic for Zvuk Fetcher
//!
//! This module contains the catalog client, the data models, pagination, the
//! task queue builder, pacing and the download orchestrator.
//!
//! # Examples
//!
//! ```rust,no_run
//! use zvuk_fetcher::app::{CatalogApi, CatalogClient, ClientConfig, PaginationConfig};
//! use zvuk_fetcher::app::pagination::favorite_tracks;
//! use zvuk_fetcher::auth::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::from_env()?;
//! let client = CatalogClient::new(ClientConfig::default(), &session)?;
//!
//! let profile = client.check_profile().await?;
//! println!("Authorized as {}", profile.name);
//!
//! let favorites = favorite_tracks(&client, PaginationConfig::default()).await;
//! for track in &favorites.items {
//!     println!("{}", track.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod models;
pub mod orchestrator;
pub mod pacing;
pub mod pagination;
pub mod paths;
pub mod queue;

// Re-export main public API
pub use client::{
    CatalogApi, CatalogClient, ClientConfig, MediaDownloader, MediaFetcher, RetryPolicy,
};
pub use models::{
    Artist, Collection, CollectionKind, CursorPage, ProfileInfo, StreamCandidate, Track,
};
pub use orchestrator::{
    DownloadOrchestrator, JobPlan, JobReport, OrchestratorConfig, OutcomeCounts, ProgressEvent,
    ProgressSink, RunSummary, TrackOutcome, TrackReport,
};
pub use pacing::{DelayBounds, DelaySource, FixedDelay, PacingConfig, PacingPolicy, RandomDelay};
pub use pagination::{PaginationConfig, StopReason, Traversal};
pub use queue::{DownloadJob, Selection, TaskQueueBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 0);
        assert_eq!(PaginationConfig::default().page_size, 100);
    }
}
