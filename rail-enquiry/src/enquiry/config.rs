//! Enquiry client configuration.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::captcha::RetryPolicy;

/// Default base URL for the enquiry endpoints.
pub const DEFAULT_BASE_URL: &str = "http://www.indianrail.gov.in/enquiry";

/// Default base URL for the live running status endpoints.
pub const DEFAULT_LIVE_BASE_URL: &str = "https://enquiry.indianrail.gov.in/ntes";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source, destination and date used when a query leaves them out.
///
/// Stations are free text and are resolved against the station list when
/// the client is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDefaults {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Configuration for the enquiry client.
#[derive(Debug, Clone)]
pub struct EnquiryConfig {
    /// Base URL of the enquiry site
    pub base_url: String,
    /// Base URL of the live running status site
    pub live_base_url: String,
    /// Directory holding `stations.json` and `trains.json`
    pub cache_dir: PathBuf,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Captcha retry policy
    pub retry: RetryPolicy,
    /// Query defaults
    pub defaults: QueryDefaults,
}

impl EnquiryConfig {
    /// Create a config pointing at the production site, caching reference
    /// lists in the current directory.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            live_base_url: DEFAULT_LIVE_BASE_URL.to_string(),
            cache_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            defaults: QueryDefaults::default(),
        }
    }

    /// Set a custom enquiry base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom live status base URL (for testing).
    pub fn with_live_base_url(mut self, url: impl Into<String>) -> Self {
        self.live_base_url = url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_defaults(mut self, defaults: QueryDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for EnquiryConfig {
    fn default() -> Self {
        Self::new()
    }
}
