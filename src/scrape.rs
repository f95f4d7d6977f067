use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect::Policy, Client, StatusCode};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use crate::extract::extract_meta_tags;
use crate::types::MetaTags;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch URL: HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Failed to fetch URL: {0}")]
    Transport(#[from] reqwest::Error),

    /// The fetch limiter was closed, which only happens on shutdown.
    #[error("Failed to fetch URL: fetcher is shutting down")]
    Closed,
}

/// Where meta tags for a URL come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_meta(&self, url: &Url) -> Result<MetaTags, FetchError>;
}

#[derive(Clone)]
pub struct ScrapeClient {
    http: Client,
    // caps outbound requests across all workers
    limit: Arc<Semaphore>,
}

impl ScrapeClient {
    pub fn new(user_agent: &str, timeout: Duration, max_concurrent: usize) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .redirect(Policy::limited(8))
            .timeout(timeout)
            .build()
            .context("building http client")?;

        Ok(Self {
            http,
            limit: Arc::new(Semaphore::new(max_concurrent.max(1))),
        })
    }

    /// Refuse new fetches; in-flight ones finish normally.
    pub fn close(&self) {
        self.limit.close();
    }

    pub async fn fetch_bytes(&self, url: &Url) -> Result<(StatusCode, Bytes), FetchError> {
        let _permit = self
            .limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::Closed)?;

        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        let body = res.bytes().await?;
        Ok((status, body))
    }

    pub async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        let (status, body) = self.fetch_bytes(url).await?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "fetched page");
        // Assume utf-8; invalid sequences are replaced rather than rejected.
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl PageSource for ScrapeClient {
    async fn fetch_meta(&self, url: &Url) -> Result<MetaTags, FetchError> {
        let html = self.fetch_html(url).await?;
        Ok(extract_meta_tags(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_carries_code_and_reason() {
        let err = FetchError::Status {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch URL: HTTP 404: Not Found");
    }

    #[tokio::test]
    async fn closed_client_refuses_to_fetch() {
        let sc = ScrapeClient::new("test-agent", Duration::from_secs(1), 2).unwrap();
        sc.close();
        let url = Url::parse("https://example.com/").unwrap();
        let err = sc.fetch_bytes(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Closed));
        assert_eq!(err.to_string(), "Failed to fetch URL: fetcher is shutting down");
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        let sc = ScrapeClient::new("test-agent", Duration::from_secs(1), 0).unwrap();
        assert_eq!(sc.limit.available_permits(), 1);
    }
}
