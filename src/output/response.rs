use crate::crawler::{BatchOutcome, CrawlOutcome};
use crate::output::PageRecord;
use crate::state::StopReason;
use serde::Serialize;

/// Message attached to successful responses that left pages unvisited
const MORE_PAGES_MESSAGE: &str = "This is a small batch. Run multiple times to get more pages.";

/// JSON body returned to the invoking caller
///
/// Batch fields are only present in batch mode. `nextBatch` is `null` on the
/// final batch so callers can tell "done" apart from "not batch mode".
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResponse {
    pub success: bool,
    pub pages: Vec<PageRecord>,
    pub total_pages: usize,
    pub debug_info: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_batches: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more_batches: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_batch: Option<Option<usize>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResponse {
    /// Empty success, used for preflight requests
    pub fn empty() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Response for a finished breadth-first run
    pub fn from_crawl(outcome: CrawlOutcome) -> Self {
        let message = outcome
            .stop_reason
            .is_budget()
            .then(|| MORE_PAGES_MESSAGE.to_string());

        Self {
            success: true,
            total_pages: outcome.pages.len(),
            pages: outcome.pages,
            debug_info: outcome.trace,
            stop_reason: Some(outcome.stop_reason),
            message,
            ..Self::default()
        }
    }

    /// Response for one batch
    pub fn from_batch(outcome: BatchOutcome) -> Self {
        let cursor = outcome.cursor;

        Self {
            success: true,
            total_pages: outcome.pages.len(),
            pages: outcome.pages,
            debug_info: outcome.trace,
            batch: Some(cursor.batch_index),
            total_batches: Some(cursor.total_batches),
            has_more_batches: Some(cursor.has_more),
            next_batch: Some(cursor.next_batch()),
            ..Self::default()
        }
    }

    /// Response for a run that could not start
    pub fn failure(error: impl ToString, mut trace: Vec<String>) -> Self {
        let error = error.to_string();
        trace.push(format!("Main error: {}", error));

        Self {
            success: false,
            debug_info: trace,
            error: Some(error),
            ..Self::default()
        }
    }
}
