//! Command-line argument parsing for Zvuk Fetcher
//!
//! This module defines the CLI structure using clap derive macros: the
//! download command, a collection listing, and session management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::Selection;
use crate::errors::Result;

/// Zvuk Fetcher - Download your Zvuk favorites and playlists
#[derive(Parser, Debug)]
#[command(
    name = "zvuk_fetcher",
    version,
    about = "Download favorites and playlists saved in a Zvuk account",
    long_about = "A paced, resumable downloader for the music saved in a Zvuk account.
Tracks are fetched one at a time with human-like pauses, and files already on disk are skipped."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Download root directory
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download favorites and playlists
    Download(DownloadArgs),

    /// List the playlists saved in the account
    Collections,

    /// Manage the stored browser session
    Auth(AuthArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// What to download: "all", "0" for favorites, or a playlist id.
    /// Prompts when omitted.
    #[arg(value_name = "SELECTION")]
    pub selection: Option<String>,

    /// List the planned jobs and their track counts without downloading
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for session management
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Session actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Store the Cookie header of a logged-in browser session
    Setup,

    /// Check the stored session against the server
    Verify,

    /// Show authentication status
    Status,

    /// Clear stored credentials
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level chosen by the verbosity flags, if any was given
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl DownloadArgs {
    /// Selection given on the command line, parsed
    ///
    /// `None` means the user should be prompted.
    pub fn parsed_selection(&self) -> Result<Option<Selection>> {
        self.selection
            .as_deref()
            .map(str::parse::<Selection>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zvuk_fetcher").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_download_selection() {
        let parsed = cli(&["download", "all", "--dry-run"]);
        match parsed.command {
            Commands::Download(args) => {
                assert!(args.dry_run);
                assert_eq!(args.parsed_selection().unwrap(), Some(Selection::All));
            }
            other => panic!("Expected download command, got {:?}", other),
        }

        match cli(&["download"]).command {
            Commands::Download(args) => assert_eq!(args.parsed_selection().unwrap(), None),
            other => panic!("Expected download command, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_selection_rejected() {
        let args = DownloadArgs {
            selection: Some("  ".to_string()),
            dry_run: false,
        };
        assert!(args.parsed_selection().is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let parsed = cli(&["collections", "-o", "/tmp/music", "--config", "z.toml"]);
        assert_eq!(parsed.global.output, Some(PathBuf::from("/tmp/music")));
        assert_eq!(parsed.global.config, Some(PathBuf::from("z.toml")));
        assert!(matches!(parsed.command, Commands::Collections));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(cli(&["-q", "collections"]).log_level(), Some(tracing::Level::ERROR));
        assert_eq!(cli(&["-v", "collections"]).log_level(), Some(tracing::Level::INFO));
        assert_eq!(
            cli(&["--very-verbose", "auth", "status"]).log_level(),
            Some(tracing::Level::DEBUG)
        );
        assert_eq!(cli(&["auth", "clear"]).log_level(), None);
    }
}
