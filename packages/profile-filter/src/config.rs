//! Configuration for country resolution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for batch country resolution against the geocoding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Distinct lookups allowed in flight at once.
    ///
    /// Default: 4.
    pub max_concurrent_lookups: usize,

    /// Sustained request rate towards the geocoder.
    ///
    /// The public Nominatim instance allows one request per second.
    /// Default: 1.
    pub requests_per_second: u32,

    /// Time budget for a single lookup. A lookup that exceeds it resolves
    /// to unresolved.
    ///
    /// Default: 10 seconds.
    pub lookup_timeout: Duration,

    /// Language for returned country names.
    ///
    /// Default: "en".
    pub language: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 4,
            requests_per_second: 1,
            lookup_timeout: Duration::from_secs(10),
            language: "en".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set lookup concurrency (clamped to at least 1).
    pub fn with_max_concurrent_lookups(mut self, n: usize) -> Self {
        self.max_concurrent_lookups = n.max(1);
        self
    }

    /// Set request rate (clamped to at least 1).
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps.max(1);
        self
    }

    /// Set per-lookup timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set result language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
