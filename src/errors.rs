//! Error types for Zvuk Fetcher
//!
//! Errors are split by concern. Authentication errors are fatal at startup,
//! catalog and download errors are recovered per operation or per track, and
//! `AppError` is what escapes to `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Authentication and session errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session cookies were supplied, or the `auth` cookie is absent
    #[error(
        "Missing Zvuk session. Set ZVUK_COOKIES to the Cookie header of a logged-in browser session (it must contain 'auth') or run 'auth setup'"
    )]
    MissingToken,

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// HTTP request failed during the profile check
    #[error("HTTP request failed during profile check")]
    Http(#[from] reqwest::Error),

    /// The server did not accept the session
    #[error("Session cookies are invalid or expired. Capture them again from the browser")]
    SessionRejected,

    /// Service base URL could not be parsed
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Client settings cannot produce a working HTTP client
    #[error("Invalid client settings: {reason}")]
    InvalidClientSettings { reason: String },

    /// Cookie header could not be parsed
    #[error("Invalid cookie header: {reason}")]
    InvalidCookie { reason: String },

    /// File I/O error during credential storage
    #[error("Failed to save credentials to file")]
    CredentialStorage(#[from] std::io::Error),

    /// Permission error on credential file
    #[error("Permission denied accessing credential file: {path}")]
    PermissionDenied { path: PathBuf },
}

/// Catalog (metadata) request errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure: connection reset, DNS, TLS
    #[error("Network error in {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// Server answered with a non-success status
    #[error("{operation} failed: HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    /// Body was not the JSON shape we expect
    #[error("Malformed response to {operation}: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },

    /// GraphQL reported errors and no data
    #[error("{operation} returned GraphQL errors: {message}")]
    GraphQl {
        operation: &'static str,
        message: String,
    },

    /// No playable stream for this track (rights, region or subscription)
    #[error("No playable stream for track {track_id}")]
    StreamUnavailable { track_id: String },

    /// Request could not be built
    #[error("Invalid request URL: {url}")]
    InvalidUrl { url: String },
}

impl CatalogError {
    /// Map a reqwest error into a catalog error for the named operation
    pub fn from_reqwest(operation: &'static str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CatalogError::Timeout { operation }
        } else if error.is_decode() {
            CatalogError::MalformedResponse {
                operation,
                reason: error.to_string(),
            }
        } else {
            CatalogError::Network {
                operation,
                source: error,
            }
        }
    }

    /// Whether this is a transport-level failure worth retrying
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Network { .. } | CatalogError::Timeout { .. }
        )
    }
}

/// Media transfer errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP transport error while fetching or streaming the body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Partial file could not be moved into place
    #[error("Could not rename {temp_path} to {final_path}: {source}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration validation failed
    #[error("Configuration validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<String> },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Selection could not be interpreted
    #[error("Invalid selection '{input}'. Enter 'all', '0' for favorites, or a playlist id")]
    InvalidSelection { input: String },

    /// Interrupted by the operator
    #[error("Interrupted by user")]
    Interrupted,

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Catalog(e) => e.is_transport(),
            AppError::Download(DownloadError::Http(_))
            | AppError::Auth(AuthError::Http(_)) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Catalog(_) => "catalog",
            AppError::Download(_) => "download",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::InvalidSelection { .. } => "selection",
            AppError::Interrupted => "interrupted",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
