//! Session verification against the profile endpoint
//!
//! The service has no login flow we drive ourselves; the browser already did
//! that. What we can do is ask for the profile and see whether the server
//! recognises the cookies.

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::app::models::ProfileInfo;
use crate::errors::{AuthError, AuthResult};

/// Display name used when the profile carries none
pub const DEFAULT_PROFILE_NAME: &str = "User";

/// Handles session verification
pub struct AuthHandler;

impl AuthHandler {
    /// Fetches the profile and checks for the `result` success marker
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionRejected` when the body is not JSON or lacks
    /// `result`, and `AuthError::Http` on transport failures or 5xx statuses.
    pub async fn check_profile(client: &Client, profile_url: &Url) -> AuthResult<ProfileInfo> {
        tracing::info!("Checking session against {}", profile_url);

        let response = client.get(profile_url.clone()).send().await?;
        let status = response.status();
        tracing::debug!("Profile response status: {}", status);

        let response = if status.is_server_error() {
            response.error_for_status()?
        } else {
            response
        };

        let body = response.text().await?;
        let profile = Self::parse_profile(&body)?;

        tracing::info!("Session accepted");
        Ok(profile)
    }

    /// Interprets a profile response body
    pub fn parse_profile(body: &str) -> AuthResult<ProfileInfo> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            tracing::debug!("Profile body is not JSON: {}", e);
            AuthError::SessionRejected
        })?;

        let result = value.get("result").ok_or(AuthError::SessionRejected)?;

        let name = result
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROFILE_NAME);

        Ok(ProfileInfo {
            name: name.to_string(),
        })
    }
}
