//! Zvuk Fetcher Library
//!
//! Downloads the favorites and playlists of a zvuk.com account using a
//! captured browser session, pacing requests at human browsing speed.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
