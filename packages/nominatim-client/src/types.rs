use serde::{Deserialize, Serialize};

/// A single search hit from `/search?format=jsonv2`.
///
/// Only the fields this client relies on are typed; Nominatim returns more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub place_id: Option<u64>,
    pub lat: String,
    pub lon: String,
    /// Full comma-separated address, most specific component first.
    pub display_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub place_type: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
}
