//! Artifact download capability.
//!
//! The refresh orchestrator never talks to the network directly. It is handed
//! a [`Fetcher`], which keeps the core testable and lets callers substitute a
//! mirror or an in-memory store.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::consts::{APP_NAME, FETCH_TIMEOUT_SECS};

#[derive(Debug, Error)]
pub enum FetchError {
  /// The HTTP client could not be constructed.
  #[error("failed to build http client: {0}")]
  Client(String),

  /// Transport-level failure (DNS, connect, TLS, body read).
  #[error("fetch failed for {url}: {message}")]
  Request { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("fetch failed for {url}: HTTP {status}")]
  Status { url: String, status: u16 },
}

/// Retrieves the bytes behind an artifact URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a reqwest client.
///
/// Proxy settings are taken from the environment and each request may take up
/// to thirty minutes, since some prebuilt archives are large.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new() -> Result<Self, FetchError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
      .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| FetchError::Client(e.to_string()))?;
    Ok(Self { client })
  }

  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl Fetcher for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = self.client.get(url).send().await.map_err(|e| FetchError::Request {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    if !response.status().is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    let bytes = response.bytes().await.map_err(|e| FetchError::Request {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    debug!(url = %url, size = bytes.len(), "download complete");

    Ok(bytes.to_vec())
  }
}
