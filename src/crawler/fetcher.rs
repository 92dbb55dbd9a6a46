//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with an identifiable bot user agent
//! - Manual redirect handling with a hop limit
//! - Streaming bodies with a size limit
//! - A single deadline covering every hop and the body
//! - Error classification
//!
//! There are no retries here. A failed fetch is reported once and the caller
//! decides what to do with it.

use crate::config::{CrawlBudget, UserAgentConfig};
use crate::FetchError;
use bytes::{Bytes, BytesMut};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A successfully fetched response body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Raw response body
    pub body: Bytes,

    /// Number of redirect hops followed
    pub redirects: u32,
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled on the client so the fetcher can count hops and
/// resolve `Location` headers itself.
///
/// # Example
///
/// ```no_run
/// use site_harvest::config::UserAgentConfig;
/// use site_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(connect_timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs single bounded GET requests
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_redirects: u32,
    max_response_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher using the limits from a crawl budget
    pub fn new(client: Client, budget: &CrawlBudget) -> Self {
        Self {
            client,
            timeout: budget.fetch_timeout,
            max_redirects: budget.max_redirects,
            max_response_bytes: budget.max_response_bytes,
        }
    }

    /// Builds the client and the fetcher in one step
    pub fn from_config(
        user_agent: &UserAgentConfig,
        budget: &CrawlBudget,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, budget.fetch_timeout)?;
        Ok(Self::new(client, budget))
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. Send GET with HTML `Accept` headers
    /// 2. On 3xx with `Location`, resolve it against the current URL and repeat
    ///    - more than `max_redirects` hops → `TooManyRedirects`
    /// 3. Any other non-2xx status → `HttpStatus`
    /// 4. Stream the body, failing with `ResponseTooLarge` past the limit
    ///
    /// All of the above runs under one deadline; running out of time yields
    /// `Timeout` no matter which step was in progress.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match tokio::time::timeout(self.timeout, self.fetch_following_redirects(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn fetch_following_redirects(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let mut current = url.clone();
        let mut redirects = 0;

        loop {
            tracing::trace!("GET {}", current);

            let response = self
                .client
                .get(current.clone())
                .header(ACCEPT, ACCEPT_HTML)
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .send()
                .await
                .map_err(|e| self.classify_error(&current, e))?;

            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                {
                    if redirects >= self.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: url.to_string(),
                            max: self.max_redirects,
                        });
                    }

                    let next = current.join(location).map_err(|e| {
                        FetchError::InvalidUrl(format!("{} (from {}): {}", location, current, e))
                    })?;

                    tracing::debug!("Redirect {} -> {}", current, next);
                    redirects += 1;
                    current = next;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    url: current.to_string(),
                    code: status.as_u16(),
                });
            }

            let body = self.read_body(&current, response).await?;

            return Ok(FetchedPage {
                final_url: current,
                status_code: status.as_u16(),
                body,
                redirects,
            });
        }
    }

    /// Reads the body chunk by chunk, aborting once it grows past the limit
    async fn read_body(&self, url: &Url, mut response: Response) -> Result<Bytes, FetchError> {
        let too_large = || FetchError::ResponseTooLarge {
            url: url.to_string(),
            limit: self.max_response_bytes,
        };

        if let Some(declared) = response.content_length() {
            if declared > self.max_response_bytes as u64 {
                return Err(too_large());
            }
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.classify_error(url, e))?
        {
            if buffer.len() + chunk.len() > self.max_response_bytes {
                return Err(too_large());
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }

    fn classify_error(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}
