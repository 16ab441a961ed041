use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One proposed place match from a single provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    /// State or province; empty when the provider does not know it.
    #[serde(default)]
    pub region: String,
    pub country: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Opaque `provider:id` tag, only meant for debugging and UI keys.
    #[serde(rename = "id")]
    pub source_id: String,
}

impl LocationCandidate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// `(0, 0)` is what several upstreams return when they fail to resolve a
    /// place, so it is never accepted as a real location.
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Whether the candidate is fit to show: named, in a country, inside
    /// coordinate bounds and not the `(0, 0)` sentinel.
    pub fn is_plausible(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.country.trim().is_empty()
            && self.coordinate().is_valid()
            && !self.is_null_island()
    }

    /// "Springfield, Illinois, United States of America" style label.
    pub fn display_name(&self) -> String {
        if self.region.is_empty() {
            format!("{}, {}", self.name, self.country)
        } else {
            format!("{}, {}, {}", self.name, self.region, self.country)
        }
    }
}

/// Body of a search request at the HTTP boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Ordered, deduplicated and bounded list of candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub results: Vec<LocationCandidate>,
}

impl AggregatedResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
pub(crate) fn candidate(name: &str, country: &str, lat: f64, lon: f64) -> LocationCandidate {
    LocationCandidate {
        name: name.to_string(),
        region: String::new(),
        country: country.to_string(),
        latitude: lat,
        longitude: lon,
        source_id: format!("test:{name}"),
    }
}
