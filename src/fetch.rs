//! Document fetch: the byte-retrieval half of the out-of-scope "Parser"
//! boundary. Parsing bytes into text (PDF/DOCX/email/HTML extraction) is
//! not this crate's concern; this module only gets the bytes, safely.

use crate::error::{ParseError, Result};
use futures_util::StreamExt;
use std::time::Duration;

/// Fetches raw document bytes from a URL.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, returning the response body bytes and the
    /// `Content-Type` header value (empty string if absent).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FetchFailed`] on network failure, timeout, a
    /// non-success status, or a body exceeding the configured size cap.
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, String)>;
}

/// `reqwest`-backed fetcher enforcing a total timeout, connect timeout, and
/// maximum body size.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestFetcher {
    /// Builds a fetcher with `total_timeout`/`connect_timeout` applied per
    /// request and bodies capped at `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(total_timeout: Duration, connect_timeout: Duration, max_bytes: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(total_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ParseError::FetchFailed(e.to_string()))?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self.client.get(url).send().await.map_err(|e| ParseError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ParseError::FetchFailed(format!("status {}", response.status())).into());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(ParseError::FetchFailed(format!("body of {len} bytes exceeds cap")).into());
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ParseError::FetchFailed(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > self.max_bytes {
                return Err(ParseError::FetchFailed("body exceeded size cap while streaming".to_string()).into());
            }
        }

        Ok((bytes, content_type))
    }
}
