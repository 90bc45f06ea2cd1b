//! Application constants for Zvuk Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for authentication
pub mod env {
    /// Raw browser `Cookie` header captured from a logged-in session
    pub const COOKIES: &str = "ZVUK_COOKIES";
}

/// Session and credential-related constants
pub mod auth {
    /// Cookie carrying the auth token; the only one the service insists on
    pub const AUTH_COOKIE: &str = "auth";

    /// Cookies a captured browser session normally carries besides `auth`
    pub const KNOWN_COOKIES: &[&str] = &["access_token", "session_id", "device_id", "wafv"];

    /// File permissions for .env file (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const ENV_FILE_PERMISSIONS: u32 = 0o600;
}

/// Zvuk service URLs, endpoints and GraphQL parameters
pub mod zvuk {
    /// Service base URL
    pub const BASE_URL: &str = "https://zvuk.com";

    /// Profile endpoint used to check that the session is alive
    pub const PROFILE_PATH: &str = "/api/tiny/profile";

    /// GraphQL endpoint
    pub const GRAPHQL_PATH: &str = "/api/v1/graphql";

    /// Application name the web client reports in `x-app-name`
    pub const APP_NAME: &str = "web-zvuk-service-desktop-app";

    /// Referrer path for the favorites page
    pub const FAVORITES_PATH: &str = "/favorites";

    /// Referrer path prefix for playlist pages
    pub const PLAYLIST_PATH: &str = "/playlist";

    /// Stream quality requested from `getStream`
    pub const STREAM_QUALITY: &str = "hq";

    /// Encoding requested from `getStream`
    pub const STREAM_ENCODE_TYPE: &str = "wv";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Browser identification sent with every request
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:147.0) Gecko/20100101 Firefox/147.0";

    /// Default accept header for catalog requests
    pub const ACCEPT: &str = "application/json, text/plain, */*";

    /// Accept header for GraphQL requests
    pub const GRAPHQL_ACCEPT: &str = "application/graphql-response+json, application/json";

    /// Default HTTP request timeout for catalog calls
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for a whole media transfer
    pub const MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;
}

/// Rate limiting, retry and traversal limits
pub mod limits {
    /// Hard ceiling on catalog requests per second, below any pacing delay
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 2;

    /// Retries on transport failures; zero keeps every failure final
    pub const DEFAULT_MAX_RETRIES: u32 = 0;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    /// Page size for both playlist and favorites listings
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Upper bound on pages fetched for a single listing
    pub const DEFAULT_MAX_PAGES: usize = 1000;
}

/// Human-cadence pacing defaults
pub mod pacing {
    use super::Duration;

    /// Shortest pause before a track
    pub const TRACK_MIN: Duration = Duration::from_secs(1);

    /// Longest pause before a track
    pub const TRACK_MAX: Duration = Duration::from_secs(4);

    /// A longer rest is taken on every Nth track of a collection
    pub const REST_EVERY: usize = 10;

    /// Shortest rest
    pub const REST_MIN: Duration = Duration::from_secs(10);

    /// Longest rest
    pub const REST_MAX: Duration = Duration::from_secs(20);

    /// Shortest pause between collections
    pub const COLLECTION_MIN: Duration = Duration::from_secs(30);

    /// Longest pause between collections
    pub const COLLECTION_MAX: Duration = Duration::from_secs(60);
}

/// File and naming constants
pub mod files {
    /// Extension of every downloaded track
    pub const TRACK_EXTENSION: &str = "mp3";

    /// Suffix of an in-flight transfer, renamed away once the body is complete
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// Default download root, relative to the working directory
    pub const DEFAULT_DOWNLOAD_ROOT: &str = "downloads";

    /// Characters removed from folder and file names
    pub const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
}

/// Selection tokens accepted by the task queue
pub mod selection {
    /// Everything: favorites followed by every playlist
    pub const ALL: &str = "all";

    /// Favorites sentinel shown in the menu
    pub const FAVORITES: &str = "0";

    /// Spelled-out aliases for the favorites sentinel
    pub const FAVORITES_ALIASES: &[&str] = &["fav", "favorites"];

    /// Folder title of the favorites collection
    pub const FAVORITES_TITLE: &str = "My Favorites";

    /// Title prefix for a playlist id missing from the listing
    pub const UNKNOWN_TITLE_PREFIX: &str = "Unknown_";
}

// Re-export commonly used constants for convenience
pub use env::COOKIES as ENV_COOKIES;
pub use http::USER_AGENT;
pub use limits::{DEFAULT_PAGE_SIZE, DEFAULT_RATE_LIMIT_RPS};
pub use zvuk::BASE_URL as ZVUK_BASE_URL;
