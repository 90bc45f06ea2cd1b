//! Catalog client for the zvuk.com web API
//!
//! The client issues the handful of named remote operations the downloader
//! needs: a profile check, the collection listing, paged track listings and
//! stream resolution. Results are typed; failures are `CatalogError`s the
//! caller decides how to treat.
//!
//! The module is organized into specialized components:
//! - `config`: client settings and construction of both HTTP clients
//! - `auth`: session verification against the profile endpoint
//! - `http`: rate-limited request execution with optional retries
//! - `operations`: GraphQL operation names, queries and wire shapes
//! - `download`: streaming media transfer into files

use async_trait::async_trait;
use reqwest::header::{ACCEPT, REFERER};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::app::models::{Collection, CursorPage, ProfileInfo, StreamCandidate, Track};
use crate::auth::Session;
use crate::constants::{http as http_constants, zvuk};
use crate::errors::{AuthError, AuthResult, CatalogError, CatalogResult};

pub mod auth;
pub mod config;
pub mod download;
pub mod http;
pub mod operations;

pub use config::ClientConfig;
pub use download::{MediaDownloader, MediaFetcher};
pub use http::RetryPolicy;

use auth::AuthHandler;
use http::HttpHandler;
use operations::{GraphQlRequest, GraphQlResponse, Operation};

/// Remote catalog operations
///
/// Implemented by [`CatalogClient`] against the live service; tests provide
/// in-memory implementations.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Confirm the session is accepted and fetch the account name
    async fn check_profile(&self) -> AuthResult<ProfileInfo>;

    /// Playlists saved in the account's collection
    async fn list_collections(&self) -> CatalogResult<Vec<Collection>>;

    /// One offset page of a playlist's tracks
    async fn list_playlist_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<Vec<Track>>;

    /// One cursor page of the account's favorite tracks
    async fn list_favorites_page(&self, cursor: &str, limit: u32)
        -> CatalogResult<CursorPage<Track>>;

    /// Media URLs for a track, requested in the context of `referrer`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::StreamUnavailable` when the account may not play
    /// the track.
    async fn resolve_stream(&self, track_id: &str, referrer: &str)
        -> CatalogResult<StreamCandidate>;
}

/// HTTP client for the zvuk.com catalog, bound to one session
pub struct CatalogClient {
    http_handler: HttpHandler,
    base_url: Url,
    graphql_url: Url,
    profile_url: Url,
    auth_token: String,
}

impl CatalogClient {
    /// Creates a client carrying the session's cookies and auth token
    ///
    /// No request is made; call [`CatalogApi::check_profile`] to verify the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the base URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: ClientConfig, session: &Session) -> AuthResult<Self> {
        let base_url = config.parsed_base_url()?;
        let graphql_url = join(&base_url, zvuk::GRAPHQL_PATH)?;
        let profile_url = join(&base_url, zvuk::PROFILE_PATH)?;

        let client = config.build_catalog_client(session)?;
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
        };
        let http_handler = HttpHandler::new(client, config.rate_limit_rps, retry)?;

        tracing::info!(
            "Created catalog client for {} with {} session cookies",
            base_url,
            session.cookie_names().len()
        );

        Ok(Self {
            http_handler,
            base_url,
            graphql_url,
            profile_url,
            auth_token: session.auth_token().to_string(),
        })
    }

    /// Get the service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Posts a named GraphQL operation and decodes its `data`
    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: Value,
        referrer: Option<&str>,
    ) -> CatalogResult<T> {
        let body = GraphQlRequest::new(operation, variables);

        let response = self
            .http_handler
            .send(operation.name, |client| {
                let request = client
                    .post(self.graphql_url.clone())
                    .header(ACCEPT, http_constants::GRAPHQL_ACCEPT)
                    .header("x-app-name", zvuk::APP_NAME)
                    .header("x-auth-token", self.auth_token.as_str())
                    .json(&body);
                match referrer {
                    Some(referrer) => request.header(REFERER, referrer),
                    None => request,
                }
            })
            .await?;

        let envelope: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::from_reqwest(operation.name, e))?;

        envelope.into_data(operation.name)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn check_profile(&self) -> AuthResult<ProfileInfo> {
        AuthHandler::check_profile(self.http_handler.client(), &self.profile_url).await
    }

    async fn list_collections(&self) -> CatalogResult<Vec<Collection>> {
        let data: operations::CollectionData = self
            .graphql(&operations::GET_COLLECTION_IDS, json!({}), None)
            .await?;
        let collections = data.into_collections();
        tracing::debug!("Collection lists {} playlists", collections.len());
        Ok(collections)
    }

    async fn list_playlist_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<Vec<Track>> {
        let data: operations::PlaylistTracksData = self
            .graphql(
                &operations::GET_PLAYLIST_TRACKS,
                operations::playlist_page_variables(playlist_id, offset, limit),
                None,
            )
            .await?;
        Ok(data.into_tracks())
    }

    async fn list_favorites_page(
        &self,
        cursor: &str,
        limit: u32,
    ) -> CatalogResult<CursorPage<Track>> {
        let data: operations::PaginatedCollectionData = self
            .graphql(
                &operations::GET_PAGINATED_COLLECTION,
                operations::favorites_page_variables(cursor, limit),
                None,
            )
            .await?;
        Ok(data.into_page())
    }

    async fn resolve_stream(
        &self,
        track_id: &str,
        referrer: &str,
    ) -> CatalogResult<StreamCandidate> {
        let data: operations::StreamData = self
            .graphql(
                &operations::GET_STREAM,
                operations::stream_variables(track_id),
                Some(referrer),
            )
            .await?;

        data.into_stream()
            .ok_or_else(|| CatalogError::StreamUnavailable {
                track_id: track_id.to_string(),
            })
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.http_handler.retry_policy())
            .finish_non_exhaustive()
    }
}

fn join(base_url: &Url, path: &str) -> AuthResult<Url> {
    base_url.join(path).map_err(|e| AuthError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        "auth=secret-token; device_id=d".parse().unwrap()
    }

    #[test]
    fn test_client_creation_builds_endpoint_urls() {
        let client = CatalogClient::new(ClientConfig::default(), &session()).unwrap();

        assert_eq!(client.base_url().host_str(), Some("zvuk.com"));
        assert_eq!(
            client.graphql_url.as_str(),
            "https://zvuk.com/api/v1/graphql"
        );
        assert_eq!(
            client.profile_url.as_str(),
            "https://zvuk.com/api/tiny/profile"
        );
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let config = ClientConfig {
            rate_limit_rps: 0,
            ..Default::default()
        };
        let result = CatalogClient::new(config, &session());
        assert!(matches!(
            result,
            Err(AuthError::InvalidClientSettings { .. })
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = CatalogClient::new(ClientConfig::default(), &session()).unwrap();
        let printed = format!("{:?}", client);
        assert!(!printed.contains("secret-token"));
    }
}
