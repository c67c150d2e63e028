//! Pure Nominatim (OpenStreetMap) search API client.
//!
//! A minimal client for free-text place search. It returns raw search hits and
//! leaves interpretation of the address to the caller.
//!
//! The public instance requires an identifying User-Agent and allows at most
//! one request per second; callers are responsible for pacing.
//!
//! # Example
//!
//! ```rust,ignore
//! use nominatim_client::NominatimClient;
//!
//! let client = NominatimClient::new("ProfileFilter/0.1 (ops@example.com)")?;
//!
//! if let Some(place) = client.best_match("paris").await? {
//!     println!("{}", place.display_name);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{NominatimError, Result};
pub use types::Place;

use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    language: Option<String>,
}

impl NominatimClient {
    /// Create a client against the public instance with a 10 second timeout.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_options(user_agent, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom (e.g. self-hosted) instance.
    pub fn with_options(user_agent: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(NominatimError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: None,
        })
    }

    /// Preferred language for returned names (`accept-language`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn search_url(&self, query: &str, limit: u32) -> String {
        let mut url = format!(
            "{}/search?q={}&format=jsonv2&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        if let Some(language) = &self.language {
            url.push_str("&accept-language=");
            url.push_str(&urlencoding::encode(language));
        }
        url
    }

    /// Run a free-text search and return up to `limit` hits, best first.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Place>> {
        let url = self.search_url(query, limit);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NominatimError::from_reqwest(e, query))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Nominatim returned an error");
            return Err(NominatimError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| NominatimError::from_reqwest(e, query))?;
        let places: Vec<Place> = serde_json::from_str(&body)?;

        debug!(hits = places.len(), "Nominatim search complete");
        Ok(places)
    }

    /// Best-ranked hit for `query`, or `None` when nothing matched.
    pub async fn best_match(&self, query: &str) -> Result<Option<Place>> {
        Ok(self.search(query, 1).await?.into_iter().next())
    }
}
