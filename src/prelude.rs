//! Prelude module for Zvuk Fetcher Library
//!
//! Re-exports the items most integrations need, so that
//! `use zvuk_fetcher::prelude::*;` is enough for typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use zvuk_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = Session::from_env()?;
//!     let config = ClientConfig::default();
//!     let catalog = Arc::new(CatalogClient::new(config.clone(), &session)?);
//!     let fetcher = Arc::new(MediaDownloader::new(&config)?);
//!
//!     let jobs = TaskQueueBuilder::new("downloads", config.parsed_base_url()?)
//!         .build(&Selection::Favorites, &[]);
//!     let mut orchestrator = DownloadOrchestrator::new(
//!         catalog,
//!         fetcher,
//!         PacingPolicy::new(PacingConfig::default()),
//!         OrchestratorConfig::default(),
//!     );
//!     orchestrator.run_queue(&jobs).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

pub use crate::app::{
    // Catalog access
    CatalogApi,
    CatalogClient,
    ClientConfig,
    // Data types
    Collection,
    // Orchestration
    DownloadJob,
    DownloadOrchestrator,
    MediaDownloader,
    MediaFetcher,
    OrchestratorConfig,
    PacingConfig,
    PacingPolicy,
    PaginationConfig,
    RunSummary,
    Selection,
    TaskQueueBuilder,
    Track,
    TrackOutcome,
};

// Session handling
pub use crate::auth::{check_credentials, get_auth_status, AuthStatus, Session};

// Configuration
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_RATE_LIMIT_RPS, ENV_COOKIES, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
