//! The geocoding seam: free text in, best-match formatted address out.
//!
//! The resolver only depends on [`Geocoder`]. [`NominatimGeocoder`] is the
//! production implementation; [`RateLimitedGeocoder`] paces any geocoder with
//! the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nominatim_client::NominatimClient;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::LookupResult;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// External lookup collaborator used by the country resolver.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best-match formatted address for `query`, `None` when nothing matched.
    ///
    /// The address is comma-separated with the country as last component,
    /// e.g. `"Paris, Île-de-France, France métropolitaine, France"`.
    async fn geocode(&self, query: &str) -> LookupResult<Option<String>>;

    /// Wait until one more lookup may be sent. Pacing wrappers override this.
    async fn ready(&self) {}

    /// Lookup for a caller that has already awaited [`Geocoder::ready`].
    async fn geocode_ready(&self, query: &str) -> LookupResult<Option<String>> {
        self.geocode(query).await
    }
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn geocode(&self, query: &str) -> LookupResult<Option<String>> {
        (**self).geocode(query).await
    }

    async fn ready(&self) {
        (**self).ready().await
    }

    async fn geocode_ready(&self, query: &str) -> LookupResult<Option<String>> {
        (**self).geocode_ready(query).await
    }
}

/// Country name from a formatted address: the component after the last `", "`.
///
/// Returns `None` for addresses whose trailing component is blank.
pub fn country_from_address(address: &str) -> Option<String> {
    address
        .rsplit(", ")
        .next()
        .map(str::trim)
        .filter(|country| !country.is_empty())
        .map(str::to_string)
}

/// Geocoder backed by the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: NominatimClient,
}

impl NominatimGeocoder {
    pub fn new(client: NominatimClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> LookupResult<Option<String>> {
        let place = self.client.best_match(query).await?;
        Ok(place.map(|p| p.display_name))
    }
}

/// A geocoder wrapper that enforces a request rate.
pub struct RateLimitedGeocoder<G: Geocoder> {
    inner: G,
    limiter: Arc<DefaultRateLimiter>,
}

impl<G: Geocoder> RateLimitedGeocoder<G> {
    /// Wrap `geocoder`, allowing `requests_per_second` lookups (at least 1).
    pub fn new(geocoder: G, requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: geocoder,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for RateLimitedGeocoder<G> {
    async fn geocode(&self, query: &str) -> LookupResult<Option<String>> {
        self.ready().await;
        self.geocode_ready(query).await
    }

    async fn ready(&self) {
        self.limiter.until_ready().await;
        self.inner.ready().await
    }

    async fn geocode_ready(&self, query: &str) -> LookupResult<Option<String>> {
        self.inner.geocode_ready(query).await
    }
}

/// Extension trait for easy rate limiting.
pub trait GeocoderExt: Geocoder + Sized {
    /// Wrap this geocoder with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedGeocoder<Self> {
        RateLimitedGeocoder::new(self, requests_per_second)
    }
}

impl<G: Geocoder + Sized> GeocoderExt for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGeocoder;
    use std::time::Instant;

    #[test]
    fn test_country_from_address() {
        assert_eq!(
            country_from_address("London, Greater London, England, United Kingdom").as_deref(),
            Some("United Kingdom")
        );
        assert_eq!(country_from_address("France").as_deref(), Some("France"));
        // only ", " delimits components
        assert_eq!(
            country_from_address("Springfield,Illinois, United States").as_deref(),
            Some("United States")
        );
        assert_eq!(country_from_address(""), None);
        assert_eq!(country_from_address("Somewhere, "), None);
    }

    #[tokio::test]
    async fn test_rate_limiting() {
        let mock = MockGeocoder::new()
            .with_address("a", "A, X")
            .with_address("b", "B, X")
            .with_address("c", "C, X");

        // 2 requests per second
        let geocoder = mock.rate_limited(2);

        let start = Instant::now();
        for q in ["a", "b", "c"] {
            assert!(geocoder.geocode(q).await.unwrap().is_some());
        }

        // burst of two, the third waits for a replenished cell (~500ms)
        assert!(start.elapsed().as_millis() >= 400);
        assert_eq!(geocoder.inner().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_ready_takes_one_cell_per_lookup() {
        let mock = MockGeocoder::new().with_address("a", "A, X");
        let geocoder = mock.rate_limited(2);

        let start = Instant::now();
        for _ in 0..2 {
            geocoder.ready().await;
            assert!(geocoder.geocode_ready("a").await.unwrap().is_some());
        }

        // two lookups fit in the initial burst
        assert!(start.elapsed().as_millis() < 400);
        assert_eq!(geocoder.inner().call_count("a"), 2);
    }

    #[tokio::test]
    async fn test_shared_geocoder_through_arc() {
        let mock = Arc::new(MockGeocoder::new().with_address("paris", "Paris, France"));
        let shared: Arc<MockGeocoder> = Arc::clone(&mock);

        let address = shared.geocode("paris").await.unwrap();
        assert_eq!(address.as_deref(), Some("Paris, France"));
        assert_eq!(mock.calls(), vec!["paris".to_string()]);
    }
}
