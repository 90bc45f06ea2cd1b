//! Session management for zvuk.com
//!
//! This module holds the captured browser session and the functions that
//! manage it: interactive setup, verification, and storage in a `.env` file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use zvuk_fetcher::app::ClientConfig;
//! use zvuk_fetcher::auth::{check_credentials, setup_credentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! if !check_credentials() {
//!     println!("Setting up the session...");
//!     setup_credentials(&ClientConfig::default()).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod session;

// Re-export main public API
pub use credentials::{
    check_credentials, clear_credentials, get_auth_status, prompt_cookie_header,
    save_credentials, setup_credentials, show_auth_status, verify_credentials, AuthStatus,
};
pub use session::Session;
