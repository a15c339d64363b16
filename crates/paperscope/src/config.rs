//! Configuration for the paperscope service.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the OpenAlex API.
    pub const BASE_URL: &str = "https://api.openalex.org";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Delay between requests (OpenAlex allows 10 req/s; stay under it).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(110);

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Collection and pagination limits.
pub mod limits {
    /// Result page size across all display modes.
    pub const PAGE_SIZE: usize = 20;

    /// Per-paper citing-id prefetch for set intersections. Larger than a
    /// display page so the intersection has a real candidate pool.
    pub const INTERSECT_PREFETCH: usize = 200;

    /// Maximum number of pinned papers.
    pub const MAX_PINS: usize = 100;

    /// Maximum journals in a filter set.
    pub const MAX_JOURNAL_FILTERS: usize = 20;

    /// Page numbers shown in the pagination window.
    pub const PAGE_WINDOW: usize = 5;
}

/// Field projections (`select=`) for API requests.
pub mod fields {
    /// Work fields consumed by the local Paper model.
    pub const WORK: &str = "id,display_name,authorships,publication_year,\
                            primary_location,doi,open_access,cited_by_count,\
                            referenced_works_count,abstract_inverted_index";

    /// Work fields plus the full outbound reference-id list.
    pub const WORK_WITH_REFERENCES: &str = "id,display_name,authorships,publication_year,\
                                            primary_location,doi,open_access,cited_by_count,\
                                            referenced_works_count,referenced_works,\
                                            abstract_inverted_index";

    /// Id-only projection for intersection prefetches.
    pub const ID_ONLY: &str = "id";
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact email for the OpenAlex polite pool (optional).
    pub mailto: Option<String>,

    /// Base URL for the OpenAlex API (for testing with mock servers).
    pub base_url: String,

    /// Directory holding the persisted pin collection.
    pub data_dir: PathBuf,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay between upstream requests.
    pub rate_limit_delay: Duration,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration.
    #[must_use]
    pub fn new(mailto: Option<String>, data_dir: PathBuf) -> Self {
        Self {
            mailto,
            base_url: api::BASE_URL.to_string(),
            data_dir,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay: api::RATE_LIMIT_DELAY,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration pointed at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            mailto: None,
            base_url: base_url.to_string(),
            data_dir: std::env::temp_dir(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::from_millis(0), // No delay in tests
            cache_ttl: Duration::from_secs(0),          // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mailto = std::env::var("OPENALEX_MAILTO").ok();
        let data_dir = std::env::var("PAPERSCOPE_DATA_DIR")
            .map_or_else(|_| PathBuf::from("."), PathBuf::from);
        Self::new(mailto, data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.mailto.is_none());
        assert_eq!(config.base_url, api::BASE_URL);
    }

    #[test]
    fn test_config_for_testing() {
        let config = Config::for_testing("http://localhost:1234");
        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(config.rate_limit_delay, Duration::from_millis(0));
    }

    #[test]
    fn test_limits() {
        assert_eq!(limits::PAGE_SIZE, 20);
        assert!(limits::INTERSECT_PREFETCH > limits::PAGE_SIZE);
    }
}
