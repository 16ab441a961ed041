//! Core library for the `citysearch` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location providers (structured geocoders plus a generative fallback)
//! - The aggregator that fans a query out, merges and deduplicates results
//! - Classification helpers and the weather snapshot model used by the UI
//! - The HTTP endpoint exposing the search
//!
//! It is used by `citysearch-cli`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod error;
pub mod geo;
pub mod model;
pub mod provider;
pub mod server;
pub mod snapshot;

pub use aggregator::{Aggregator, AggregatorBuilder, dedup_candidates};
pub use classify::{
    AqiLevel, Beaufort, SeverityTier, UvLevel, classify_aqi, classify_beaufort, classify_uv,
    wind_cardinal,
};
pub use config::{Config, ProviderConfig, SearchSettings, ServerSettings};
pub use error::ProviderError;
pub use geo::{Coordinate, DedupRule, distance_km, is_same_location};
pub use model::{AggregatedResult, LocationCandidate, SearchRequest};
pub use provider::{LocationProvider, ProviderId, Tier};
pub use snapshot::WeatherSnapshot;
