use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Harvest
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub extractor: ExtractorConfig,
    pub batch: BatchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// How link hosts are compared against the start URL's domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainMatch {
    /// The bare domain or its `www.` variant only
    #[default]
    Exact,
    /// The bare domain and any subdomain of it
    Subdomains,
}

/// Crawl loop and fetch budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Default starting URL when an invocation does not supply one
    pub start_url: String,

    /// Maximum number of fetches per run
    pub max_pages: u32,

    /// Wall-clock budget for a whole run (milliseconds)
    pub max_wall_clock_ms: u64,

    /// Deadline for a single fetch, redirects and body included (milliseconds)
    pub fetch_timeout_ms: u64,

    /// Maximum redirect hops followed per fetch
    pub max_redirects: u32,

    /// Maximum accepted response body size
    pub max_response_bytes: usize,

    /// Politeness delay between consecutive fetches (milliseconds)
    pub inter_request_delay_ms: u64,

    /// Maximum discovered links enqueued per page
    pub links_per_page_cap: usize,

    /// Restrict discovered links to the start URL's domain
    pub same_domain_only: bool,

    /// Host comparison mode used when `same_domain_only` is set
    pub domain_match: DomainMatch,

    /// Accept the seed page even when its content is below the threshold
    pub force_include_seed: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.manitouspringsco.gov/".to_string(),
            max_pages: 20,
            max_wall_clock_ms: 25_000,
            fetch_timeout_ms: 5_000,
            max_redirects: 5,
            max_response_bytes: 1024 * 1024,
            inter_request_delay_ms: 800,
            links_per_page_cap: 15,
            same_domain_only: true,
            domain_match: DomainMatch::Exact,
            force_include_seed: false,
        }
    }
}

impl CrawlerConfig {
    /// Builds the immutable per-run budget from this section
    pub fn budget(&self) -> CrawlBudget {
        CrawlBudget {
            max_pages: self.max_pages,
            max_wall_clock: Duration::from_millis(self.max_wall_clock_ms),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            max_redirects: self.max_redirects,
            max_response_bytes: self.max_response_bytes,
            inter_request_delay: Duration::from_millis(self.inter_request_delay_ms),
            links_per_page_cap: self.links_per_page_cap,
            same_domain_only: self.same_domain_only,
        }
    }
}

/// Immutable budget for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    pub max_pages: u32,
    pub max_wall_clock: Duration,
    pub fetch_timeout: Duration,
    pub max_redirects: u32,
    pub max_response_bytes: usize,
    pub inter_request_delay: Duration,
    pub links_per_page_cap: usize,
    pub same_domain_only: bool,
}

/// Content extraction thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractorConfig {
    /// Pages are accepted only when content is strictly longer than this (chars)
    pub min_content_chars: usize,

    /// Title truncation length (chars)
    pub title_max_chars: usize,

    /// Content truncation length (chars)
    pub content_max_chars: usize,

    /// Upper bound on links extracted from a regular page
    pub max_links: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 50,
            title_max_chars: 100,
            content_max_chars: 3000,
            max_links: 20,
        }
    }
}

/// Batch mode configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Sitemap-like page listing the site's URLs; defaults to `<start-url>/sitemap`
    pub index_url: Option<String>,

    /// Number of URLs per batch
    pub batch_size: usize,

    /// Upper bound on links taken from the index page
    pub index_link_cap: usize,

    /// Path prefixes fetched first, in this order
    pub priority_sections: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            index_url: None,
            batch_size: 15,
            index_link_cap: 1000,
            priority_sections: [
                "/government",
                "/departments",
                "/services",
                "/residents",
                "/business",
                "/visitors",
                "/community",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    ///
    /// The parenthesized part is omitted when no contact is configured.
    pub fn header_value(&self) -> String {
        let contacts: Vec<String> = self
            .contact_url
            .iter()
            .map(|u| format!("+{}", u))
            .chain(self.contact_email.iter().cloned())
            .collect();

        if contacts.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contacts.join("; ")
            )
        }
    }
}
