//! Run state definitions for the crawl loop
//!
//! A run starts `Running` and ends in exactly one `Stopped` state.

use serde::Serialize;
use std::fmt;

/// Why a crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The fetch budget (`max-pages`) was used up
    PageCapReached,

    /// No URLs were left to visit
    FrontierExhausted,

    /// The wall-clock budget ran out
    TimeBudgetExceeded,
}

impl StopReason {
    /// Returns true if more pages could have been visited with a larger budget
    pub fn is_budget(&self) -> bool {
        matches!(self, Self::PageCapReached | Self::TimeBudgetExceeded)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PageCapReached => "page cap reached",
            Self::FrontierExhausted => "frontier exhausted",
            Self::TimeBudgetExceeded => "time budget exceeded",
        };
        write!(f, "{}", s)
    }
}

/// State of one crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlState {
    #[default]
    Running,
    Stopped(StopReason),
}

impl CrawlState {
    /// Returns true while the loop should keep iterating
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// The stop reason, if the loop has stopped
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Running => None,
            Self::Stopped(reason) => Some(*reason),
        }
    }

    /// Moves a running loop to `Stopped`
    ///
    /// Stopping is final: a second call keeps the first reason.
    pub fn stop(&mut self, reason: StopReason) {
        if self.is_running() {
            *self = Self::Stopped(reason);
        }
    }
}
