//! One interactive filtering session over one loaded dataset.
//!
//! The session owns the country resolver, and with it a fresh resolution
//! cache; dropping the session discards every cached lookup.

use std::collections::HashSet;

use crate::config::ResolverConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::geocoder::Geocoder;
use crate::location::{filter_by_country, label_countries, LabeledLocations, COUNTRY_COLUMN};
use crate::projector::Projection;
use crate::resolver::CountryResolver;

pub struct FilterSession<G: Geocoder> {
    resolver: CountryResolver<G>,
}

impl<G: Geocoder> FilterSession<G> {
    pub fn new(geocoder: G, config: ResolverConfig) -> Self {
        Self {
            resolver: CountryResolver::new(geocoder, config),
        }
    }

    pub fn resolver(&self) -> &CountryResolver<G> {
        &self.resolver
    }

    /// Resolve countries for every row. Call once per dataset, then filter
    /// the labeled result as often as needed.
    pub async fn label_locations(&self, dataset: Dataset) -> Result<LabeledLocations> {
        label_countries(dataset, &self.resolver).await
    }

    /// Filter an already labeled dataset by country selection.
    pub fn filter_locations(
        &self,
        labeled: &LabeledLocations,
        selected: &HashSet<String>,
    ) -> Result<Projection> {
        let filtered = filter_by_country(&labeled.dataset, COUNTRY_COLUMN, selected)?;
        Ok(Projection::new(labeled.dataset.clone(), filtered))
    }
}
