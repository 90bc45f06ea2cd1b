//! Command-line interface components
//!
//! This module contains CLI-specific code for Zvuk Fetcher, including
//! argument parsing, progress display, and user interaction.

pub mod args;
pub mod commands;
pub mod progress;
pub mod startup;

pub use args::{AuthAction, AuthArgs, Cli, Commands, DownloadArgs, GlobalArgs};
pub use commands::{handle_auth, handle_collections, handle_download};
pub use progress::{ConsoleReporter, DisplayMode};
pub use startup::{
    connect, load_collections, prompt_from, prompt_selection, read_selection, render_menu,
    Connection,
};
