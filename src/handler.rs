//! Invocation handler
//!
//! Turns one invocation (method, optional start URL, optional batch index)
//! into one complete [`CrawlResponse`]. Failures never escape: they become a
//! `success: false` response carrying the error and the trace so far.

use crate::config::Config;
use crate::crawler::{BatchCoordinator, Crawler};
use crate::output::CrawlResponse;
use crate::url::normalize_url;

/// One incoming request
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// HTTP method of the request; `OPTIONS` is answered without crawling
    pub method: String,

    /// Start URL; the configured default is used when absent
    pub url: Option<String>,

    /// Batch index; selects batch mode when present
    pub batch: Option<usize>,
}

impl Invocation {
    /// A GET invocation for the given start URL and batch
    pub fn get(url: Option<String>, batch: Option<usize>) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            batch,
        }
    }
}

/// Handles one invocation
pub async fn handle(invocation: Invocation, config: &Config) -> CrawlResponse {
    if invocation.method.eq_ignore_ascii_case("OPTIONS") {
        return CrawlResponse::empty();
    }

    let start = invocation
        .url
        .as_deref()
        .unwrap_or(config.crawler.start_url.as_str());

    let start = match normalize_url(start) {
        Ok(start) => start,
        Err(e) => {
            tracing::error!("Invalid start URL {}: {}", start, e);
            return CrawlResponse::failure(e, Vec::new());
        }
    };

    match invocation.batch {
        Some(batch_index) => {
            tracing::info!("Batch mode: batch {} of {}", batch_index, start);
            let coordinator = match BatchCoordinator::from_config(config, &start) {
                Ok(coordinator) => coordinator,
                Err(e) => return CrawlResponse::failure(e, Vec::new()),
            };
            match coordinator.run(batch_index).await {
                Ok(outcome) => CrawlResponse::from_batch(outcome),
                Err(failure) => {
                    tracing::error!("Batch {} failed: {}", batch_index, failure);
                    CrawlResponse::failure(failure.error, failure.trace)
                }
            }
        }
        None => {
            tracing::info!("Crawl mode from {}", start);
            let crawler = match Crawler::from_config(config, &start) {
                Ok(crawler) => crawler,
                Err(e) => return CrawlResponse::failure(e, Vec::new()),
            };
            match crawler.run(start).await {
                Ok(outcome) => CrawlResponse::from_crawl(outcome),
                Err(failure) => {
                    tracing::error!("Crawl failed: {}", failure);
                    CrawlResponse::failure(failure.error, failure.trace)
                }
            }
        }
    }
}
