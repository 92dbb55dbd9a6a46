//! URL handling module for Site-Harvest
//!
//! This module provides URL normalization, domain scoping, and the filters
//! that keep utility pages and document downloads out of the crawl.

mod domain;
mod filter;
mod normalize;

pub use domain::{extract_domain, DomainScope};
pub use filter::{is_document, is_social, is_utility_path};
pub use normalize::{normalize_parsed, normalize_url};
