//! Core HTTP operations with rate limiting and retry logic
//!
//! Every catalog request goes through [`HttpHandler::send`], which waits on a
//! `governor` limiter and, when retries are enabled, backs off exponentially
//! on transport failures and overload statuses.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::{AuthError, AuthResult, CatalogError, CatalogResult};

/// Retry behaviour for catalog requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first; 0 disables retrying
    pub max_retries: u32,
    /// Delay unit for exponential backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt only
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based); the first retry waits `base_delay`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
    retry: RetryPolicy,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client, rate limit and retry policy
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidClientSettings` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32, retry: RetryPolicy) -> AuthResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            retry,
        })
    }

    /// Builds the rate limiter with the specified rate limit
    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> AuthResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            AuthError::InvalidClientSettings {
                reason: "Rate limit must be non-zero".to_string(),
            }
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Sends the request produced by `build`, retrying per the policy
    ///
    /// `build` is called once per attempt. A non-success status is returned as
    /// `CatalogError::Status`; 429 and 5xx overload statuses are retried along
    /// with transport failures.
    pub async fn send<F>(&self, operation: &'static str, build: F) -> CatalogResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retries = 0;
        loop {
            // Apply rate limiting with jitter so requests never line up exactly
            self.rate_limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                .await;

            let error = match build(&self.client).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("{} answered {}", operation, response.status());
                    return Ok(response);
                }
                Ok(response) => CatalogError::Status {
                    operation,
                    status: response.status().as_u16(),
                },
                Err(e) => CatalogError::from_reqwest(operation, e),
            };

            if retries >= self.retry.max_retries || !Self::is_retryable(&error) {
                return Err(error);
            }

            retries += 1;
            let delay = self.retry.backoff(retries);
            warn!(
                "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                operation,
                retries,
                self.retry.max_retries,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(error: &CatalogError) -> bool {
        match error {
            CatalogError::Status { status, .. } => matches!(
                StatusCode::from_u16(*status),
                Ok(StatusCode::TOO_MANY_REQUESTS)
                    | Ok(StatusCode::BAD_GATEWAY)
                    | Ok(StatusCode::SERVICE_UNAVAILABLE)
                    | Ok(StatusCode::GATEWAY_TIMEOUT)
            ),
            other => other.is_transport(),
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Retry policy in effect
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}
