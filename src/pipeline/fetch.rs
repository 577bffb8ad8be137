//! Byte retrieval: the single point of network I/O in the pipeline.
//!
//! The whole body is buffered in memory. A failed download never yields
//! partial bytes, and nothing is retried: a transient network failure is
//! surfaced to the caller immediately.

use crate::config::ConversionConfig;
use crate::error::Doc2MdError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Default `User-Agent` header sent with every download.
pub const DEFAULT_USER_AGENT: &str = concat!("doc2md/", env!("CARGO_PKG_VERSION"));

/// Retrieves the resource at a fully resolved URL.
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Doc2MdError>;
}

/// [`ByteFetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build the client once; it is reused for every request.
    pub fn new(config: &ConversionConfig) -> Result<Self, Doc2MdError> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Doc2MdError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.download_timeout_secs,
        })
    }

    fn map_transport_error(&self, url: &str, e: reqwest::Error) -> Doc2MdError {
        if e.is_timeout() {
            Doc2MdError::DownloadTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            Doc2MdError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Doc2MdError> {
        info!("Downloading: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(url, e))?;

        if !response.status().is_success() {
            return Err(Doc2MdError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(url, e))?;

        debug!(bytes = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }
}
