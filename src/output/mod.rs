//! Output module for crawl results
//!
//! This module holds the page records produced by a run and the JSON
//! response handed back to the invoking caller.

mod record;
mod response;

pub use record::PageRecord;
pub use response::CrawlResponse;
