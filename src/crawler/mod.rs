//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Bounded HTTP fetching with manual redirects
//! - HTML content and link extraction
//! - The breadth-first frontier
//! - The time- and page-budgeted crawl loop
//! - Batch mode over a sitemap-like index page

mod batch;
mod controller;
mod extractor;
mod fetcher;
mod frontier;

pub use batch::{batch_slice, prioritize, BatchCoordinator, BatchCursor, BatchOutcome};
pub use controller::{CrawlOutcome, Crawler};
pub use extractor::{Extraction, Extractor, NO_TITLE, PARSE_ERROR_TITLE};
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use frontier::Frontier;

use crate::CrawlError;
use thiserror::Error;

/// A run that failed before producing a result, with the trace so far
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: CrawlError,
    pub trace: Vec<String>,
}

impl RunFailure {
    pub(crate) fn new(error: impl Into<CrawlError>, trace: Trace) -> Self {
        Self {
            error: error.into(),
            trace: trace.into_lines(),
        }
    }
}

/// Human-readable diagnostic lines returned alongside the pages
///
/// Every line is also emitted as a log event.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    lines: Vec<String>,
}

impl Trace {
    pub(crate) fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{}", line);
        self.lines.push(line);
    }

    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
