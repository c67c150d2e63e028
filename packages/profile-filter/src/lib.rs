//! Country and keyword filtering for exported professional profile lists.
//!
//! Two independent pipelines over one tabular model:
//!
//! - **Location**: normalize each free-text `Location`, resolve it to a
//!   country through a [`Geocoder`] (one lookup per distinct string per
//!   session), then keep the rows whose country was selected.
//! - **Keywords**: keep the rows whose chosen column contains a
//!   case-sensitive or case-insensitive term.
//!
//! Both yield a [`Projection`]: the labeled input, the filtered rows and the
//! filtered profile URLs, each serializable as CSV.
//!
//! # Usage
//!
//! ```rust,ignore
//! use profile_filter::{Dataset, FilterSession, NominatimGeocoder, ResolverConfig};
//! use profile_filter::geocoder::GeocoderExt;
//!
//! let client = nominatim_client::NominatimClient::new("ProfileFilter/0.1")?.with_language("en");
//! let config = ResolverConfig::default();
//! let geocoder = NominatimGeocoder::new(client).rate_limited(config.requests_per_second);
//! let session = FilterSession::new(geocoder, config);
//!
//! let labeled = session.label_locations(Dataset::from_path("profiles.csv")?).await?;
//! let selected = ["France".to_string()].into_iter().collect();
//! let projection = session.filter_locations(&labeled, &selected)?;
//! projection.write_to_dir("out")?;
//! ```
//!
//! # Modules
//!
//! - [`dataset`] - Rows, schema and the CSV codec
//! - [`normalize`] - Location noise stripping
//! - [`geocoder`] - Geocoding seam, Nominatim adapter, rate limiting
//! - [`resolver`] - Country resolution and the session cache
//! - [`location`] - Country labeling and filtering
//! - [`keywords`] - Keyword match engine
//! - [`projector`] - Output views and artifacts
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod dataset;
pub mod error;
pub mod geocoder;
pub mod keywords;
pub mod location;
pub mod normalize;
pub mod projector;
pub mod resolver;
pub mod session;
pub mod testing;

pub use config::ResolverConfig;
pub use dataset::{Dataset, Row, LOCATION_COLUMN, PROFILE_URL_COLUMN};
pub use error::{FilterError, LookupError, Result};
pub use geocoder::{country_from_address, Geocoder, NominatimGeocoder, RateLimitedGeocoder};
pub use keywords::{
    keyword_projection, label_keyword_matches, match_keywords, parse_keyword_list, KeywordSet,
    DEFAULT_CASE_SENSITIVE, MATCH_LABEL_COLUMN,
};
pub use location::{
    filter_by_country, label_countries, observed_countries, LabeledLocations, COUNTRY_COLUMN,
};
pub use normalize::{normalize_location, NOISE_TERMS};
pub use projector::{profile_urls, Artifacts, ExportPaths, Projection, ProjectionSummary};
pub use resolver::{CountryResolver, Resolution, ResolutionCache, ResolutionStats};
pub use session::FilterSession;
