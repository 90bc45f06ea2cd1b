//! Media transfer with streaming writes
//!
//! Audio is fetched from CDN URLs with a plain client that carries no session
//! cookies. The body is streamed chunk by chunk into `<name>.part` and renamed
//! to the final name once the last chunk is written, so the final path only
//! ever holds complete payloads. A failed transfer leaves its `.part` file
//! behind; the next attempt truncates it.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::REFERER;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::app::paths::partial_path;
use crate::errors::{AuthResult, DownloadError, DownloadResult};

/// Fetches a media URL into a file
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Stream `url` into `destination`, sending `referrer` as `Referer`
    ///
    /// Returns the number of bytes written.
    async fn fetch_to_file(
        &self,
        url: &str,
        referrer: &str,
        destination: &Path,
    ) -> DownloadResult<u64>;
}

/// Media fetcher backed by the cookie-less client
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    client: Client,
}

impl MediaDownloader {
    /// Build the downloader from client settings
    pub fn new(config: &ClientConfig) -> AuthResult<Self> {
        Ok(Self::from_client(config.build_media_client()?))
    }

    /// Wrap an existing client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn stream_to_partial(
        &self,
        url: Url,
        referrer: &str,
        temp_path: &Path,
    ) -> DownloadResult<u64> {
        let response = self
            .client
            .get(url)
            .header(REFERER, referrer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let mut file = File::create(temp_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl MediaFetcher for MediaDownloader {
    async fn fetch_to_file(
        &self,
        url: &str,
        referrer: &str,
        destination: &Path,
    ) -> DownloadResult<u64> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let temp_path = partial_path(destination);
        let written = self.stream_to_partial(parsed, referrer, &temp_path).await?;

        tokio::fs::rename(&temp_path, destination)
            .await
            .map_err(|source| DownloadError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.to_path_buf(),
                source,
            })?;

        tracing::debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }
}
