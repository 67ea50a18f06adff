//! Test utilities for distbump-lib.
//!
//! Provides an in-memory [`Fetcher`] so refresh tests never touch the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{FetchError, Fetcher};

/// Fetcher that serves canned responses and records every URL it was asked for.
#[derive(Default)]
pub struct MockFetcher {
  responses: HashMap<String, Result<Vec<u8>, u16>>,
  calls: Mutex<Vec<String>>,
}

impl MockFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serve `bytes` for `url`.
  pub fn with_artifact(mut self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
    self.responses.insert(url.to_string(), Ok(bytes.into()));
    self
  }

  /// Answer `url` with an HTTP error status.
  pub fn with_status(mut self, url: &str, status: u16) -> Self {
    self.responses.insert(url.to_string(), Err(status));
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

#[async_trait]
impl Fetcher for MockFetcher {
  async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    self.calls.lock().unwrap().push(url.to_string());
    match self.responses.get(url) {
      Some(Ok(bytes)) => Ok(bytes.clone()),
      Some(Err(status)) => Err(FetchError::Status {
        url: url.to_string(),
        status: *status,
      }),
      None => Err(FetchError::Request {
        url: url.to_string(),
        message: "connection refused".to_string(),
      }),
    }
  }
}
