//! Location pipeline: label each profile with a resolved country, then keep
//! the rows whose country was selected.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::dataset::{Dataset, LOCATION_COLUMN};
use crate::error::Result;
use crate::geocoder::Geocoder;
use crate::normalize::normalize_location;
use crate::resolver::{CountryResolver, ResolutionStats};

/// Derived column holding the resolved country; absent when unresolved.
pub const COUNTRY_COLUMN: &str = "Resolved Country";

/// A dataset labeled with resolved countries.
#[derive(Debug, Clone)]
pub struct LabeledLocations {
    /// Input rows plus the [`COUNTRY_COLUMN`].
    pub dataset: Dataset,
    /// Distinct resolved countries in order of first appearance.
    pub countries: Vec<String>,
    pub stats: ResolutionStats,
}

/// Normalize every `Location`, resolve each distinct key once and set the
/// [`COUNTRY_COLUMN`], replacing labels from an earlier run.
///
/// Absent locations normalize to the empty key and stay unresolved.
pub async fn label_countries<G: Geocoder>(
    dataset: Dataset,
    resolver: &CountryResolver<G>,
) -> Result<LabeledLocations> {
    let keys: Vec<String> = dataset
        .column_values(LOCATION_COLUMN)?
        .map(|location| normalize_location(location.unwrap_or_default()))
        .collect();

    debug!(rows = keys.len(), "Normalized locations");

    let (resolutions, stats) = resolver.resolve_all(keys.iter().map(String::as_str)).await;

    let labels: Vec<Option<String>> = keys
        .iter()
        .map(|key| {
            resolutions
                .get(key)
                .and_then(|r| r.country())
                .map(str::to_string)
        })
        .collect();

    let dataset = dataset.set_column(COUNTRY_COLUMN, labels);
    let countries = observed_countries(&dataset, COUNTRY_COLUMN)?;

    info!(
        rows = dataset.len(),
        countries = countries.len(),
        "Labeled dataset with countries"
    );

    Ok(LabeledLocations {
        dataset,
        countries,
        stats,
    })
}

/// Distinct non-empty values of `column`, first appearance first.
pub fn observed_countries(dataset: &Dataset, column: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(dataset
        .column_values(column)?
        .flatten()
        .filter(|country| seen.insert(*country))
        .map(str::to_string)
        .collect())
}

/// Keep rows whose `column` value is one of `selected`.
///
/// An empty selection applies no filter and returns the dataset unchanged.
/// Rows without a resolved value never match a non-empty selection.
pub fn filter_by_country(
    dataset: &Dataset,
    column: &str,
    selected: &HashSet<String>,
) -> Result<Dataset> {
    if selected.is_empty() {
        return Ok(dataset.clone());
    }

    let mask: Vec<bool> = dataset
        .column_values(column)?
        .map(|country| country.is_some_and(|c| selected.contains(c)))
        .collect();

    let filtered = dataset.select(&mask);
    debug!(
        selected = selected.len(),
        kept = filtered.len(),
        total = dataset.len(),
        "Filtered by country"
    );
    Ok(filtered)
}
