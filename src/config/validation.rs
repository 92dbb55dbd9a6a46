use crate::config::types::{BatchConfig, Config, CrawlerConfig, ExtractorConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on configured redirect hops
const MAX_REDIRECTS_LIMIT: u32 = 20;

/// Smallest response size limit that still fits a real page
const MIN_RESPONSE_BYTES: usize = 1024;

const MAX_TITLE_CHARS: usize = 200;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_extractor_config(&config.extractor)?;
    validate_batch_config(&config.batch)?;
    validate_user_agent_config(&config.user_agent)
}

/// Fails with `message` unless `condition` holds
fn ensure(condition: bool, message: impl FnOnce() -> String) -> ConfigResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message()))
    }
}

fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_http_url("start-url", &config.start_url)?;

    ensure(config.max_pages >= 1, || {
        format!("max-pages must be >= 1, got {}", config.max_pages)
    })?;
    ensure(config.fetch_timeout_ms > 0, || {
        "fetch-timeout-ms must be > 0".to_string()
    })?;
    // A single fetch has to fit inside the run
    ensure(config.max_wall_clock_ms >= config.fetch_timeout_ms, || {
        format!(
            "max-wall-clock-ms ({}) must be >= fetch-timeout-ms ({})",
            config.max_wall_clock_ms, config.fetch_timeout_ms
        )
    })?;
    ensure(config.max_redirects <= MAX_REDIRECTS_LIMIT, || {
        format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS_LIMIT, config.max_redirects
        )
    })?;
    ensure(config.max_response_bytes >= MIN_RESPONSE_BYTES, || {
        format!(
            "max-response-bytes must be >= {}, got {}",
            MIN_RESPONSE_BYTES, config.max_response_bytes
        )
    })
}

fn validate_extractor_config(config: &ExtractorConfig) -> ConfigResult<()> {
    ensure(
        (1..=MAX_TITLE_CHARS).contains(&config.title_max_chars),
        || {
            format!(
                "title-max-chars must be between 1 and {}, got {}",
                MAX_TITLE_CHARS, config.title_max_chars
            )
        },
    )?;
    // Otherwise no page could ever pass the threshold
    ensure(config.content_max_chars > config.min_content_chars, || {
        format!(
            "content-max-chars ({}) must exceed min-content-chars ({})",
            config.content_max_chars, config.min_content_chars
        )
    })
}

fn validate_batch_config(config: &BatchConfig) -> ConfigResult<()> {
    if let Some(index_url) = &config.index_url {
        validate_http_url("index-url", index_url)?;
    }

    ensure(config.batch_size >= 1, || "batch-size must be >= 1".to_string())?;

    match config
        .priority_sections
        .iter()
        .find(|section| !section.starts_with('/'))
    {
        Some(section) => Err(ConfigError::Validation(format!(
            "priority section '{}' must start with '/'",
            section
        ))),
        None => Ok(()),
    }
}

/// The crawler name goes into the User-Agent header verbatim
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    let name = &config.crawler_name;
    ensure(!name.is_empty(), || "crawler-name cannot be empty".to_string())?;
    ensure(
        name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
        || {
            format!(
                "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
                name
            )
        },
    )?;

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    match &config.contact_email {
        Some(email) => validate_email(email),
        None => Ok(()),
    }
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        ))),
    }
}

/// Shape check only: one `@`, a local part, and a dotted domain
fn validate_email(email: &str) -> ConfigResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    };

    ensure(valid, || format!("Invalid email format: '{}'", email))
}
