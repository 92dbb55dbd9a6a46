//! Batch mode - resumable depth-1 coverage of a whole site
//!
//! Each invocation fetches the site's index page, derives the same ordered
//! candidate list from it, and processes one fixed-size slice of that list.
//! Nothing is kept between invocations; the caller passes back the next
//! batch index to continue.

use crate::config::{Config, CrawlBudget};
use crate::crawler::{Extractor, Fetcher, RunFailure, Trace};
use crate::output::PageRecord;
use crate::url::{is_utility_path, normalize_parsed, DomainScope};
use crate::CrawlError;
use std::time::{Duration, Instant};
use url::Url;

/// Position of one batch within the site's candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    pub batch_index: usize,
    pub total_batches: usize,
    pub has_more: bool,
}

impl BatchCursor {
    pub fn new(batch_index: usize, total_batches: usize) -> Self {
        Self {
            batch_index,
            total_batches,
            has_more: batch_index + 1 < total_batches,
        }
    }

    /// Cursor for `candidate_count` URLs split into batches of `batch_size`
    pub fn for_candidates(batch_index: usize, candidate_count: usize, batch_size: usize) -> Self {
        Self::new(batch_index, candidate_count.div_ceil(batch_size.max(1)))
    }

    /// Index the caller should request next, if any
    pub fn next_batch(&self) -> Option<usize> {
        self.has_more.then_some(self.batch_index + 1)
    }
}

/// Result of one batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub pages: Vec<PageRecord>,
    pub trace: Vec<String>,
    pub cursor: BatchCursor,
}

/// Orders candidates by section priority
///
/// URLs whose path starts with one of `sections` come first, grouped in the
/// order the sections are listed; everything else follows in its original
/// order. The result depends only on the inputs.
pub fn prioritize(candidates: Vec<Url>, sections: &[String]) -> Vec<Url> {
    let sections: Vec<String> = sections.iter().map(|s| s.to_lowercase()).collect();
    let rank = |url: &Url| {
        let path = url.path().to_lowercase();
        sections
            .iter()
            .position(|section| path.starts_with(section.as_str()))
            .unwrap_or(sections.len())
    };

    let mut ranked: Vec<(usize, Url)> = candidates.into_iter().map(|u| (rank(&u), u)).collect();
    // Stable sort keeps discovery order within each group
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, url)| url).collect()
}

/// Returns `[index * size, (index + 1) * size)`, clamped to the list
pub fn batch_slice(candidates: &[Url], batch_index: usize, batch_size: usize) -> &[Url] {
    let start = batch_index.saturating_mul(batch_size).min(candidates.len());
    let end = start.saturating_add(batch_size).min(candidates.len());
    &candidates[start..end]
}

/// Longest a batch can take: the index fetch plus a delay and a timed-out
/// fetch for every URL in the slice
fn worst_case_duration(budget: &CrawlBudget, batch_size: usize) -> Duration {
    let per_page = budget.inter_request_delay + budget.fetch_timeout;
    u32::try_from(batch_size)
        .ok()
        .and_then(|n| per_page.checked_mul(n))
        .and_then(|pages| pages.checked_add(budget.fetch_timeout))
        .unwrap_or(Duration::MAX)
}

/// Processes one slice of a site's index per invocation
pub struct BatchCoordinator {
    fetcher: Fetcher,
    index_extractor: Extractor,
    page_extractor: Extractor,
    index_url: Url,
    scope: DomainScope,
    budget: CrawlBudget,
    batch_size: usize,
    priority_sections: Vec<String>,
    min_content_chars: usize,
}

impl BatchCoordinator {
    /// Builds a coordinator for the site of `start`
    ///
    /// The index page is `batch.index-url` when configured, otherwise
    /// `/sitemap` on the start URL's origin.
    pub fn from_config(config: &Config, start: &Url) -> Result<Self, CrawlError> {
        let budget = config.crawler.budget();
        let scope = DomainScope::from_url(start, config.crawler.domain_match)?;
        let fetcher = Fetcher::from_config(&config.user_agent, &budget)?;

        let index_url = match &config.batch.index_url {
            Some(index) => Url::parse(index).map_err(|e| crate::UrlError::Parse(e.to_string()))?,
            None => start
                .join("/sitemap")
                .map_err(|e| crate::UrlError::Parse(e.to_string()))?,
        };

        let page_extractor =
            Extractor::new(scope.clone(), &config.extractor, budget.same_domain_only);
        let index_extractor = page_extractor
            .clone()
            .with_link_limit(config.batch.index_link_cap);

        let batch_size = config.batch.batch_size.max(1);
        let worst_case = worst_case_duration(&budget, batch_size);
        if worst_case > budget.max_wall_clock {
            tracing::warn!(
                "A batch of {} may take up to {}ms, over the {}ms wall-clock budget; \
                 lower batch-size or inter-request-delay-ms",
                batch_size,
                worst_case.as_millis(),
                budget.max_wall_clock.as_millis()
            );
        }

        Ok(Self {
            fetcher,
            index_extractor,
            page_extractor,
            index_url: normalize_parsed(index_url)?,
            scope,
            budget,
            batch_size,
            priority_sections: config.batch.priority_sections.clone(),
            min_content_chars: config.extractor.min_content_chars,
        })
    }

    /// The index page candidates are read from
    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// Fetches the index page and returns the ordered candidate list
    pub async fn candidates(&self) -> Result<Vec<Url>, RunFailure> {
        let mut trace = Trace::default();
        self.load_candidates(&mut trace)
            .await
            .map_err(|e| RunFailure::new(e, trace))
    }

    async fn load_candidates(&self, trace: &mut Trace) -> Result<Vec<Url>, CrawlError> {
        trace.push(format!("Fetching index {}", self.index_url));

        let fetched = self
            .fetcher
            .fetch(&self.index_url)
            .await
            .map_err(|source| CrawlError::Index {
                url: self.index_url.to_string(),
                source,
            })?;

        let final_url = normalize_parsed(fetched.final_url.clone()).unwrap_or(fetched.final_url);
        let extraction = self.index_extractor.extract(&fetched.body, &final_url);
        let found = extraction.links.len();

        let candidates: Vec<Url> = extraction
            .links
            .into_iter()
            .filter(|link| *link != self.index_url && *link != final_url)
            .filter(|link| !is_utility_path(link))
            .collect();

        trace.push(format!(
            "Found {} links in index, {} candidates after filtering",
            found,
            candidates.len()
        ));

        Ok(prioritize(candidates, &self.priority_sections))
    }

    /// Fetches and extracts one batch
    ///
    /// Out-of-range indexes produce an empty batch with `has_more = false`.
    /// Every URL in the slice is fetched, even once the wall-clock budget is
    /// spent, so consecutive indexes cover the whole candidate list. Only a
    /// failure to fetch the index page fails the run.
    pub async fn run(&self, batch_index: usize) -> Result<BatchOutcome, RunFailure> {
        let started = Instant::now();
        let mut trace = Trace::default();

        let candidates = match self.load_candidates(&mut trace).await {
            Ok(candidates) => candidates,
            Err(e) => {
                trace.push(format!("✗ Error scraping index: {}", e));
                return Err(RunFailure::new(e, trace));
            }
        };

        let cursor = BatchCursor::for_candidates(batch_index, candidates.len(), self.batch_size);
        let slice = batch_slice(&candidates, batch_index, self.batch_size);

        trace.push(format!(
            "Batch {} of {}: {} URLs",
            batch_index + 1,
            cursor.total_batches,
            slice.len()
        ));

        let mut pages = Vec::new();
        let delay = self.budget.inter_request_delay;

        // The whole slice is always processed; stopping part way would leave
        // URLs that no later batch index covers.
        for (position, url) in slice.iter().enumerate() {
            // The index fetch precedes every page fetch
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            trace.push(format!("Scraping page {}: {}", position + 1, url));

            let fetched = match self.fetcher.fetch(url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    trace.push(format!("✗ Error scraping {}: {}", url, e));
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

            let extraction = match self.page_extractor.try_extract(&fetched.body, &final_url) {
                Ok(extraction) => extraction,
                Err(e) => {
                    trace.push(format!("✗ Error parsing {}: {}", final_url, e));
                    continue;
                }
            };

            let content_chars = extraction.content_chars();
            if content_chars > self.min_content_chars {
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
        }

        trace.push(format!(
            "Batch {} done: {} of {} pages accepted in {}ms",
            batch_index + 1,
            pages.len(),
            slice.len(),
            started.elapsed().as_millis()
        ));

        Ok(BatchOutcome {
            pages,
            trace: trace.into_lines(),
            cursor,
        })
    }
}
