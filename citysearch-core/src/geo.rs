//! Coordinates, great-circle distance and the proximity rules used to
//! decide whether two candidates name the same place.

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// Default rectangular dedup threshold, roughly 11 km at the equator.
pub const DEFAULT_THRESHOLD_DEG: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for HaversineLocation {
    fn from(c: Coordinate) -> Self {
        HaversineLocation {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

/// Haversine distance on a 6371 km sphere. Out-of-range input is the
/// caller's problem; nothing here fails.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    distance(a.into(), b.into(), Units::Kilometers)
}

/// Rectangular proximity check: both the latitude and the longitude
/// difference must be below `threshold_deg`.
///
/// This is the cheap rule the search has always used. It shrinks toward the
/// poles and does not wrap at the antimeridian.
pub fn is_same_location(a: Coordinate, b: Coordinate, threshold_deg: f64) -> bool {
    (a.latitude - b.latitude).abs() < threshold_deg
        && (a.longitude - b.longitude).abs() < threshold_deg
}

/// How the aggregator decides two candidates are duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DedupRule {
    /// Flat degree box, see [`is_same_location`].
    Degrees { threshold: f64 },
    /// True great-circle distance below `km`.
    Haversine { km: f64 },
}

impl Default for DedupRule {
    fn default() -> Self {
        Self::Degrees {
            threshold: DEFAULT_THRESHOLD_DEG,
        }
    }
}

impl DedupRule {
    pub fn matches(&self, a: Coordinate, b: Coordinate) -> bool {
        match *self {
            Self::Degrees { threshold } => is_same_location(a, b, threshold),
            Self::Haversine { km } => distance_km(a, b) < km,
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Degrees { threshold } => threshold.is_finite() && threshold > 0.0,
            Self::Haversine { km } => km.is_finite() && km > 0.0,
        }
    }
}
