//! Filters for links that should never become pages
//!
//! Two lists live here: non-content targets (documents and social networks)
//! dropped at extraction time, and utility paths (login, search, calendars,
//! the sitemap itself) dropped before links are enqueued or batched.

use url::Url;

/// Path suffixes of downloadable documents
const DOCUMENT_SUFFIXES: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip",
];

/// Hosts of social networks commonly linked from site chrome
const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "youtube.com",
    "nextdoor.com",
    "linkedin.com",
];

/// Leading path segments of account, search and listing pages
const UTILITY_SEGMENTS: &[&str] = &[
    "myaccount",
    "login",
    "logout",
    "register",
    "search",
    "calendar",
    "sitemap",
];

/// Returns true if the URL points at a document download
pub fn is_document(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    DOCUMENT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Returns true if the URL is on a social network
pub fn is_social(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_lowercase();
        SOCIAL_HOSTS
            .iter()
            .any(|social| host == *social || host.ends_with(&format!(".{}", social)))
    })
}

/// Returns true if the URL is not worth recording as a page
///
/// Covers documents, social links, and any path whose first segment is a
/// utility section (`/login`, `/search/results`, `/Calendar.aspx`, ...).
pub fn is_utility_path(url: &Url) -> bool {
    if is_document(url) || is_social(url) {
        return true;
    }

    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or("")
        .to_lowercase();
    let stem = first_segment
        .split_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&first_segment);

    UTILITY_SEGMENTS.contains(&stem)
}
