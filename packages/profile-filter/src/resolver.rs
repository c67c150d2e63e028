//! Country resolution with a session-scoped cache.
//!
//! Every distinct normalized location costs at most one geocoder call per
//! cache, whatever the outcome. Concurrent callers asking for the same key
//! share a single in-flight lookup and all observe its result.

use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::config::ResolverConfig;
use crate::error::LookupError;
use crate::geocoder::{country_from_address, Geocoder};

/// Outcome of resolving one normalized location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    Country(String),
    Unresolved,
}

impl Resolution {
    pub fn country(&self) -> Option<&str> {
        match self {
            Self::Country(name) => Some(name),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Country(_))
    }
}

/// Normalized location -> resolution, never expired.
///
/// One cache per filtering session; drop it to forget everything.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Resolution>>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed resolution for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Resolution> {
        self.lock().get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slot for `key`, created empty on first sight.
    fn slot(&self, key: &str) -> Arc<OnceCell<Resolution>> {
        Arc::clone(self.lock().entry(key.to_string()).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<Resolution>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counters from one batch resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    pub distinct_keys: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolves normalized locations to country names through a [`Geocoder`].
pub struct CountryResolver<G: Geocoder> {
    geocoder: G,
    cache: Arc<ResolutionCache>,
    config: ResolverConfig,
    lookups: AtomicUsize,
}

impl<G: Geocoder> CountryResolver<G> {
    /// Resolver with a fresh, empty cache.
    pub fn new(geocoder: G, config: ResolverConfig) -> Self {
        Self::with_cache(geocoder, Arc::new(ResolutionCache::new()), config)
    }

    /// Resolver reading and filling an existing cache.
    pub fn with_cache(geocoder: G, cache: Arc<ResolutionCache>, config: ResolverConfig) -> Self {
        Self {
            geocoder,
            cache,
            config,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Geocoder calls issued by this resolver so far.
    pub fn lookups_issued(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Resolve one normalized location, consulting the cache first.
    ///
    /// Lookup failures of any kind yield [`Resolution::Unresolved`] and are
    /// cached like any other answer.
    pub async fn resolve(&self, normalized: &str) -> Resolution {
        let slot = self.cache.slot(normalized);
        if let Some(hit) = slot.get() {
            debug!(key = normalized, "Resolution cache hit");
            return hit.clone();
        }
        slot.get_or_init(|| self.lookup(normalized)).await.clone()
    }

    /// Resolve every distinct key once, with bounded concurrency.
    pub async fn resolve_all<'a, I>(&self, keys: I) -> (HashMap<String, Resolution>, ResolutionStats)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = keys.into_iter().filter(|k| seen.insert(*k)).collect();

        let before = self.lookups_issued();
        let resolutions: HashMap<String, Resolution> = stream::iter(distinct)
            .map(|key| async move { (key.to_string(), self.resolve(key).await) })
            .buffer_unordered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await;

        let resolved = resolutions.values().filter(|r| r.is_resolved()).count();
        let stats = ResolutionStats {
            distinct_keys: resolutions.len(),
            resolved,
            unresolved: resolutions.len() - resolved,
        };

        info!(
            distinct_keys = stats.distinct_keys,
            lookups = self.lookups_issued() - before,
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            "Batch country resolution complete"
        );

        (resolutions, stats)
    }

    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Resolution {
        if query.is_empty() {
            return Resolution::Unresolved;
        }

        // queueing for a rate-limit slot is not part of the lookup budget
        self.geocoder.ready().await;
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let outcome = tokio::time::timeout(
            self.config.lookup_timeout,
            self.geocoder.geocode_ready(query),
        )
        .await
        .unwrap_or(Err(LookupError::Timeout));

        match outcome {
            Ok(Some(address)) => match country_from_address(&address) {
                Some(country) => {
                    debug!(address = %address, country = %country, "Resolved location");
                    Resolution::Country(country)
                }
                None => {
                    warn!(address = %address, "Geocoder returned an address without a country");
                    Resolution::Unresolved
                }
            },
            Ok(None) => {
                debug!("Location not found by geocoder");
                Resolution::Unresolved
            }
            Err(e) => {
                warn!(error = %e, "Geocoding lookup failed");
                Resolution::Unresolved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::GeocoderExt;
    use crate::testing::MockGeocoder;
    use std::time::Duration;

    fn resolver(mock: MockGeocoder) -> CountryResolver<MockGeocoder> {
        CountryResolver::new(mock, ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_resolves_trailing_component() {
        let mock = MockGeocoder::new()
            .with_address("london", "London, Greater London, England, United Kingdom");
        let resolver = resolver(mock);

        assert_eq!(
            resolver.resolve("london").await,
            Resolution::Country("United Kingdom".into())
        );
        assert_eq!(
            resolver.cache().get("london"),
            Some(Resolution::Country("United Kingdom".into()))
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_lookup() {
        let mock = MockGeocoder::new().with_address("paris", "Paris, France");
        let resolver = resolver(mock.clone());

        for _ in 0..3 {
            assert_eq!(resolver.resolve("paris").await.country(), Some("France"));
        }
        assert_eq!(mock.call_count("paris"), 1);
        assert_eq!(resolver.lookups_issued(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_is_cached_too() {
        let mock = MockGeocoder::new();
        let resolver = resolver(mock.clone());

        assert_eq!(resolver.resolve("unknown xyzzy123").await, Resolution::Unresolved);
        assert_eq!(resolver.resolve("unknown xyzzy123").await, Resolution::Unresolved);
        assert_eq!(mock.call_count("unknown xyzzy123"), 1);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_unresolved() {
        let mock = MockGeocoder::new().with_failure("berlin", "connection reset");
        let resolver = resolver(mock.clone());

        assert_eq!(resolver.resolve("berlin").await, Resolution::Unresolved);
        assert_eq!(resolver.resolve("berlin").await, Resolution::Unresolved);
        assert_eq!(mock.call_count("berlin"), 1);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_unresolved() {
        let mock = MockGeocoder::new().with_hang("tokyo");
        let config = ResolverConfig::default().with_lookup_timeout(Duration::from_millis(50));
        let resolver = CountryResolver::new(mock, config);

        assert_eq!(resolver.resolve("tokyo").await, Resolution::Unresolved);
    }

    #[tokio::test]
    async fn test_blank_country_is_unresolved() {
        let mock = MockGeocoder::new().with_address("nowhere", "Nowhere, ");
        let resolver = resolver(mock);

        assert_eq!(resolver.resolve("nowhere").await, Resolution::Unresolved);
    }

    #[tokio::test]
    async fn test_empty_key_never_hits_geocoder() {
        let mock = MockGeocoder::new();
        let resolver = resolver(mock.clone());

        assert_eq!(resolver.resolve("").await, Resolution::Unresolved);
        assert!(mock.calls().is_empty());
        assert_eq!(resolver.cache().get(""), Some(Resolution::Unresolved));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_lookup() {
        let mock = MockGeocoder::new()
            .with_address("paris", "Paris, France")
            .with_delay(Duration::from_millis(50));
        let resolver = Arc::new(resolver(mock.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve("paris").await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().country(), Some("France"));
        }
        assert_eq!(mock.call_count("paris"), 1);
    }

    #[tokio::test]
    async fn test_resolve_all_deduplicates_keys() {
        let mock = MockGeocoder::new()
            .with_address("london", "London, England, United Kingdom")
            .with_address("paris", "Paris, France");
        let resolver = resolver(mock.clone());

        let keys = ["london", "paris", "london", "unknown", "paris", "london"];
        let (resolutions, stats) = resolver.resolve_all(keys).await;

        assert_eq!(resolutions.len(), 3);
        assert_eq!(resolutions["paris"].country(), Some("France"));
        assert_eq!(resolutions["unknown"], Resolution::Unresolved);
        assert_eq!(
            stats,
            ResolutionStats {
                distinct_keys: 3,
                resolved: 2,
                unresolved: 1
            }
        );
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_shared_cache_across_resolvers() {
        let cache = Arc::new(ResolutionCache::new());
        let mock = MockGeocoder::new().with_address("paris", "Paris, France");

        let first = CountryResolver::with_cache(mock.clone(), Arc::clone(&cache), ResolverConfig::default());
        first.resolve("paris").await;

        let second = CountryResolver::with_cache(mock.clone(), cache, ResolverConfig::default());
        assert_eq!(second.resolve("paris").await.country(), Some("France"));
        assert_eq!(second.lookups_issued(), 0);
        assert_eq!(mock.call_count("paris"), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_queue_does_not_count_against_timeout() {
        let keys = ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7"];
        let mut mock = MockGeocoder::new();
        for key in keys {
            mock = mock.with_address(key, format!("{key}, Atlantis"));
        }

        // 4 per second: the last keys wait up to a second for a slot
        let config = ResolverConfig::default()
            .with_max_concurrent_lookups(8)
            .with_lookup_timeout(Duration::from_millis(300));
        let resolver = CountryResolver::new(mock.clone().rate_limited(4), config);

        let (resolutions, stats) = resolver.resolve_all(keys).await;

        assert!(resolutions.values().all(|r| r.country() == Some("Atlantis")));
        assert_eq!(
            stats,
            ResolutionStats {
                distinct_keys: 8,
                resolved: 8,
                unresolved: 0
            }
        );
        assert_eq!(mock.calls().len(), 8);
        assert_eq!(resolver.lookups_issued(), 8);
    }
}
