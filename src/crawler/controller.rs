//! Crawl controller - the budgeted breadth-first loop
//!
//! One call to [`Crawler::run`] is one invocation: it builds a fresh
//! frontier, visits pages one at a time in discovery order, and stops on the
//! first of page cap, empty frontier, or wall-clock budget.

use crate::config::{Config, CrawlBudget};
use crate::crawler::{Extractor, Fetcher, Frontier, RunFailure, Trace};
use crate::output::PageRecord;
use crate::state::{CrawlState, StopReason};
use crate::url::{is_utility_path, normalize_parsed, DomainScope};
use crate::CrawlError;
use std::time::Instant;
use url::Url;

/// Result of one breadth-first run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Accepted pages in acceptance order
    pub pages: Vec<PageRecord>,

    /// Diagnostic trace
    pub trace: Vec<String>,

    /// Why the loop ended
    pub stop_reason: StopReason,

    /// Number of fetches performed
    pub fetch_count: u32,
}

/// Breadth-first crawler for one domain
pub struct Crawler {
    fetcher: Fetcher,
    extractor: Extractor,
    scope: DomainScope,
    budget: CrawlBudget,
    min_content_chars: usize,
    force_include_seed: bool,
}

impl Crawler {
    /// Creates a crawler from its parts
    pub fn new(
        fetcher: Fetcher,
        extractor: Extractor,
        scope: DomainScope,
        budget: CrawlBudget,
        min_content_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            scope,
            budget,
            min_content_chars,
            force_include_seed: false,
        }
    }

    /// Records the seed page even when its content is below the threshold
    pub fn with_forced_seed(mut self, force: bool) -> Self {
        self.force_include_seed = force;
        self
    }

    /// Builds a crawler scoped to the domain of `start`
    pub fn from_config(config: &Config, start: &Url) -> Result<Self, CrawlError> {
        let budget = config.crawler.budget();
        let scope = DomainScope::from_url(start, config.crawler.domain_match)?;
        let fetcher = Fetcher::from_config(&config.user_agent, &budget)?;
        let extractor = Extractor::new(scope.clone(), &config.extractor, budget.same_domain_only);

        Ok(Self::new(
            fetcher,
            extractor,
            scope,
            budget,
            config.extractor.min_content_chars,
        )
        .with_forced_seed(config.crawler.force_include_seed))
    }

    /// Runs the crawl loop from a seed URL
    ///
    /// # Loop
    ///
    /// 1. Stop if the wall-clock budget is spent
    /// 2. Stop if `max_pages` fetches have been made
    /// 3. Dequeue; stop if the frontier is empty
    /// 4. Skip already-visited URLs without using a fetch slot
    /// 5. Wait the politeness delay (not before the first fetch)
    /// 6. Mark visited, fetch, extract, record or skip
    /// 7. Enqueue up to `links_per_page_cap` filtered links
    ///
    /// Per-page failures only add trace lines. The run fails only when the
    /// seed itself cannot be fetched.
    pub async fn run(&self, seed: Url) -> Result<CrawlOutcome, RunFailure> {
        let started = Instant::now();
        let mut trace = Trace::default();

        let seed = match normalize_parsed(seed) {
            Ok(seed) => seed,
            Err(e) => return Err(RunFailure::new(e, trace)),
        };

        let mut frontier = Frontier::new();
        if self.force_include_seed {
            frontier.seed_forced(seed.clone());
        } else {
            frontier.seed([seed.clone()]);
        }

        trace.push(format!(
            "Starting crawl at {} (max {} pages, {}ms budget)",
            seed,
            self.budget.max_pages,
            self.budget.max_wall_clock.as_millis()
        ));

        let mut state = CrawlState::Running;
        let mut pages = Vec::new();
        let mut fetch_count: u32 = 0;

        while state.is_running() {
            let elapsed = started.elapsed();
            if elapsed >= self.budget.max_wall_clock {
                state.stop(StopReason::TimeBudgetExceeded);
                continue;
            }

            if fetch_count >= self.budget.max_pages {
                state.stop(StopReason::PageCapReached);
                continue;
            }

            let Some(url) = frontier.dequeue_next() else {
                state.stop(StopReason::FrontierExhausted);
                continue;
            };

            if frontier.is_visited(&url) {
                tracing::trace!("Already visited: {}", url);
                continue;
            }

            let delay = self.budget.inter_request_delay;
            if fetch_count > 0 && !delay.is_zero() {
                if elapsed + delay >= self.budget.max_wall_clock {
                    state.stop(StopReason::TimeBudgetExceeded);
                    continue;
                }
                tokio::time::sleep(delay).await;
            }

            frontier.mark_visited(&url);
            fetch_count += 1;
            trace.push(format!("Scraping page {}: {}", fetch_count, url));

            let fetched = match self.fetcher.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    trace.push(format!("✗ Error scraping {}: {}", url, e));
                    if fetch_count == 1 {
                        let error = CrawlError::Seed {
                            url: url.to_string(),
                            source: e,
                        };
                        return Err(RunFailure::new(error, trace));
                    }
                    continue;
                }
            };

            let final_url = normalize_parsed(fetched.final_url.clone()).unwrap_or(fetched.final_url);
            if self.budget.same_domain_only && !self.scope.contains(&final_url) {
                trace.push(format!(
                    "✗ Skipped: {} redirects off-domain to {}",
                    url, final_url
                ));
                continue;
            }

            // A redirect target counts as visited too; landing on one that was
            // already processed must not record it twice.
            if fetched.redirects > 0 && final_url != url && !frontier.mark_visited(&final_url) {
                trace.push(format!(
                    "✗ Skipped: {} redirects to already visited {}",
                    url, final_url
                ));
                continue;
            }

            let extraction = match self.extractor.try_extract(&fetched.body, &final_url) {
                Ok(extraction) => extraction,
                Err(e) => {
                    trace.push(format!("✗ Error parsing {}: {}", final_url, e));
                    continue;
                }
            };

            let content_chars = extraction.content_chars();
            if content_chars > self.min_content_chars || frontier.is_forced(&url) {
                trace.push(format!(
                    "✓ Added: {} ({} words)",
                    extraction.title, extraction.word_count
                ));
                pages.push(PageRecord::new(
                    final_url.to_string(),
                    extraction.title,
                    extraction.content,
                    extraction.word_count,
                ));
            } else {
                trace.push(format!(
                    "✗ Skipped: {} (only {} chars)",
                    extraction.title, content_chars
                ));
            }

            let next: Vec<Url> = extraction
                .links
                .into_iter()
                .filter(|link| !is_utility_path(link) && !frontier.is_visited(link))
                .take(self.budget.links_per_page_cap)
                .collect();
            let added = frontier.enqueue(next);
            tracing::debug!(
                "Enqueued {} links from {} (frontier size {})",
                added,
                final_url,
                frontier.len()
            );
        }

        let stop_reason = state
            .stop_reason()
            .unwrap_or(StopReason::FrontierExhausted);

        trace.push(format!(
            "Stopped: {} after {} fetches, {} pages accepted in {}ms",
            stop_reason,
            fetch_count,
            pages.len(),
            started.elapsed().as_millis()
        ));

        Ok(CrawlOutcome {
            pages,
            trace: trace.into_lines(),
            stop_reason,
            fetch_count,
        })
    }
}
