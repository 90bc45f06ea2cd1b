//! Configuration for the download orchestrator

use std::path::PathBuf;

use crate::app::pagination::PaginationConfig;
use crate::constants::files;

/// Settings the orchestrator is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Root under which collection folders are created
    pub destination_root: PathBuf,
    /// Page size and page bound for listings
    pub pagination: PaginationConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from(files::DEFAULT_DOWNLOAD_ROOT),
            pagination: PaginationConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Set the download root
    pub fn with_destination_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.destination_root = root.into();
        self
    }

    /// Set the listing page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.pagination.page_size = page_size;
        self
    }

    /// Set the page bound for one listing
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.pagination.max_pages = max_pages;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.pagination.page_size == 0 {
            return Err("Page size cannot be zero".to_string());
        }

        if self.pagination.max_pages == 0 {
            return Err("Page limit cannot be zero".to_string());
        }

        if self.destination_root.as_os_str().is_empty() {
            return Err("Destination root cannot be empty".to_string());
        }

        Ok(())
    }
}
