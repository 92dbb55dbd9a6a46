//! State module for tracking crawl progress
//!
//! - `CrawlState`: the `Running → Stopped(reason)` machine driving the crawl loop
//! - `StopReason`: why a run ended

mod crawl_state;

pub use crawl_state::{CrawlState, StopReason};
