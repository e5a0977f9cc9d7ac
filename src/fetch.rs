//! Page fetching.
//!
//! The [`Fetcher`] trait is the only way the batch code reaches the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::encoding;
use crate::error::{Error, Result};

/// Desktop browser identification sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves page markup for a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    ///
    /// Non-success statuses and network failures are errors; callers decide
    /// whether that skips a page or aborts.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client sending `user_agent` with every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Client with the browser user agent and default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TLS backend cannot be initialised.
    pub fn with_defaults() -> Result<Self> {
        Self::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let body = response.bytes().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url, bytes = body.len(), "fetched page");
        Ok(encoding::decode_body(&body, content_type.as_deref()))
    }
}
