//! HTTP client configuration and building logic
//!
//! Two clients are built from one configuration: the catalog client, which
//! carries the session cookies, and the media client, which carries nothing
//! but the browser identification.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Session;
use crate::constants::{http, limits, zvuk};
use crate::errors::{AuthError, AuthResult};

/// Configuration for the catalog and media HTTP clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service base URL
    pub base_url: String,
    /// Browser identification string
    pub user_agent: String,
    /// Enable HTTP/2 adaptive window tuning
    pub http2: bool,
    /// Catalog request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Timeout for a whole media transfer
    #[serde(with = "humantime_serde")]
    pub media_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Ceiling on catalog requests per second
    pub rate_limit_rps: u32,
    /// Retries on transport failures (0 = every failure is final)
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: zvuk::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            http2: true,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            media_timeout: http::MEDIA_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            max_retries: limits::DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(limits::RETRY_BASE_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Parsed base URL
    pub fn parsed_base_url(&self) -> AuthResult<Url> {
        Url::parse(&self.base_url).map_err(|e| AuthError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Builds the session-bound catalog client
    ///
    /// Cookies from the session are placed in a jar scoped to the base URL, and
    /// the browser-like headers the web player sends are set as defaults.
    pub fn build_catalog_client(&self, session: &Session) -> AuthResult<Client> {
        let base_url = self.parsed_base_url()?;

        let jar = Jar::default();
        for (name, value) in session.cookies() {
            jar.add_cookie_str(&format!("{}={}", name, value), &base_url);
        }

        let origin = base_url.origin().ascii_serialization();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(http::ACCEPT));
        headers.insert(REFERER, header_value(&format!("{}/", origin))?);
        headers.insert(ORIGIN, header_value(&origin)?);

        let mut client_builder = Client::builder()
            .cookie_provider(Arc::new(jar))
            .default_headers(headers)
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(http::MAX_REDIRECTS));

        if self.http2 {
            client_builder = client_builder.http2_adaptive_window(true);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(AuthError::Http)
    }

    /// Builds the plain media client: no cookies, no auth headers
    pub fn build_media_client(&self) -> AuthResult<Client> {
        Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.media_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(http::MAX_REDIRECTS))
            .build()
            .map_err(AuthError::Http)
    }
}

fn header_value(value: &str) -> AuthResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| AuthError::InvalidCookie {
        reason: format!("cannot use '{}' as a header: {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        "auth=token; device_id=dev".parse().unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, zvuk::BASE_URL);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert!(config.user_agent.contains("Mozilla"));
    }

    #[test]
    fn test_catalog_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_catalog_client(&session()).is_ok());
    }

    #[test]
    fn test_media_client_creation() {
        let config = ClientConfig {
            media_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert!(config.build_media_client().is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.build_catalog_client(&session()).is_err());
    }
}
