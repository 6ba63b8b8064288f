//! HTTP page loader
//!
//! Transport failures never cross this boundary: anything other than a
//! readable `200 OK` or `404 Not Found` body comes back as an empty string,
//! which callers treat as a retryable failure.

use crate::config::HttpConfig;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetches raw page content for a URL
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Returns the page body, or an empty string on any failure
    async fn load(&self, url: &str) -> String;
}

/// Builds an HTTP client with the configured user agent and timeout
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageLoader` over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    /// Builds the loader's client
    ///
    /// # Errors
    ///
    /// `HarvestError::Http` when the client cannot be built, for example
    /// because the user agent is not a valid header value.
    pub fn new(config: &HttpConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageLoader for HttpLoader {
    async fn load(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                tracing::error!("Could not load {} ({}): {}", url, kind, e);
                return String::new();
            }
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::NOT_FOUND {
            tracing::warn!("Unexpected status {} for {}", status.as_u16(), url);
            return String::new();
        }

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} returned 404, keeping its body", url);
        }

        match response.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::error!("Could not read body of {}: {}", url, e);
                String::new()
            }
        }
    }
}
