use crate::config::DomainMatch;
use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the lowercase host from a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The set of hosts a crawl is allowed to stay within
///
/// Built from the start URL's host with any `www.` prefix removed, so a crawl
/// seeded at `https://www.example.com/` and one seeded at
/// `https://example.com/` cover the same pages.
///
/// # Examples
///
/// ```
/// use site_harvest::config::DomainMatch;
/// use site_harvest::url::DomainScope;
/// use url::Url;
///
/// let start = Url::parse("https://www.example.com/").unwrap();
/// let scope = DomainScope::from_url(&start, DomainMatch::Exact).unwrap();
/// assert!(scope.contains_host("example.com"));
/// assert!(scope.contains_host("www.example.com"));
/// assert!(!scope.contains_host("blog.example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    base: String,
    mode: DomainMatch,
}

impl DomainScope {
    /// Builds a scope from a bare domain such as `example.com`
    pub fn new(domain: &str, mode: DomainMatch) -> Self {
        let lower = domain.to_lowercase();
        let base = lower.strip_prefix("www.").unwrap_or(&lower).to_string();
        Self { base, mode }
    }

    /// Builds a scope from the host of a start URL
    pub fn from_url(url: &Url, mode: DomainMatch) -> UrlResult<Self> {
        let host = extract_domain(url).ok_or(UrlError::MissingDomain)?;
        Ok(Self::new(&host, mode))
    }

    /// The domain this scope is anchored on, without `www.`
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Checks a lowercase host against the scope
    pub fn contains_host(&self, host: &str) -> bool {
        match self.mode {
            DomainMatch::Exact => {
                host == self.base || host.strip_prefix("www.") == Some(self.base.as_str())
            }
            DomainMatch::Subdomains => {
                host == self.base
                    || host
                        .strip_suffix(self.base.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }

    /// Checks a URL's host against the scope
    pub fn contains(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| self.contains_host(&host))
    }
}
