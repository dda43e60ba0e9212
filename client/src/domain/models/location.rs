//! Geocoding results.

use serde::{Deserialize, Serialize};

use super::amount;

/// One candidate position for a geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(alias = "lat", deserialize_with = "amount::deserialize")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng", deserialize_with = "amount::deserialize")]
    pub longitude: f64,
    #[serde(default, alias = "address", alias = "formatted_address")]
    pub display_name: Option<String>,
}
