use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Final URL after redirects
    pub url: String,

    /// Page title, truncated to `title-max-chars`
    pub title: String,

    /// Normalized plain text
    pub content: String,

    /// Whitespace-delimited tokens in `content`
    pub word_count: usize,

    /// When the page was accepted
    pub fetched_at: DateTime<Utc>,
}

impl PageRecord {
    /// Builds a record stamped with the current time
    pub fn new(url: String, title: String, content: String, word_count: usize) -> Self {
        Self {
            url,
            title,
            content,
            word_count,
            fetched_at: Utc::now(),
        }
    }
}
