use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use profile_filter::ResolverConfig;

/// Geocoding settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub nominatim_url: String,
    pub user_agent: String,
    pub requests_per_second: u32,
    pub max_concurrent_lookups: usize,
    pub lookup_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| nominatim_client::DEFAULT_BASE_URL.to_string()),
            user_agent: env::var("NOMINATIM_USER_AGENT").unwrap_or_else(|_| {
                format!("profile-filter/{}", env!("CARGO_PKG_VERSION"))
            }),
            requests_per_second: env::var("GEOCODER_RPS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("GEOCODER_RPS must be a positive number")?,
            max_concurrent_lookups: env::var("GEOCODER_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("GEOCODER_CONCURRENCY must be a positive number")?,
            lookup_timeout: Duration::from_secs(
                env::var("GEOCODER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("GEOCODER_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new()
            .with_requests_per_second(self.requests_per_second)
            .with_max_concurrent_lookups(self.max_concurrent_lookups)
            .with_lookup_timeout(self.lookup_timeout)
    }
}
