//! Site-Harvest: a bounded, polite, resumable single-domain crawler
//!
//! This crate discovers pages within one target domain, extracts normalized
//! text and outbound links from raw HTML, and returns a batch of page records.
//! Every run is self-contained and bounded by a wall-clock budget, so it fits
//! inside short-lived stateless invocations. Long sites are covered either by
//! repeated breadth-first runs or by the batch mode, which slices a sitemap
//! into fixed-size batches addressed by index.

pub mod config;
pub mod crawler;
pub mod handler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Harvest operations
///
/// Only failures that end a whole run surface as a `CrawlError`. Failures
/// for individual pages are recorded in the run's trace and skipped.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to fetch seed {url}: {source}")]
    Seed { url: String, source: FetchError },

    #[error("Failed to fetch index {url}: {source}")]
    Index { url: String, source: FetchError },
}

/// Errors produced by a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timeout after {timeout_ms}ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP {code} for {url}")]
    HttpStatus { url: String, code: u16 },

    #[error("Too many redirects (more than {max}) from {url}")]
    TooManyRedirects { url: String, max: u32 },

    #[error("Response from {url} exceeds {limit} bytes")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while extracting a page
///
/// These never leave the extractor; they are downgraded to a degraded
/// extraction so one malformed page cannot abort a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Body contains no markup")]
    NotHtml,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Site-Harvest operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchCoordinator, Crawler};
pub use output::{CrawlResponse, PageRecord};
pub use state::{CrawlState, StopReason};
pub use url::{normalize_url, DomainScope};
