//! Fan-out search across providers, merged into one deduplicated list.
//!
//! Callers are expected to debounce keystrokes (250–500 ms) before calling
//! [`Aggregator::resolve_locations`]. Dropping the returned future abandons
//! every in-flight upstream request.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    AggregatedResult, Config, LocationCandidate,
    config::SearchSettings,
    geo::DedupRule,
    provider::{LocationProvider, ProviderId, Tier, provider_from_config},
};

#[derive(Debug)]
pub struct Aggregator {
    /// Primary and secondary providers, sorted by tier.
    structured: Vec<Box<dyn LocationProvider>>,
    /// Generative providers, consulted in order only when `structured`
    /// produced nothing.
    fallbacks: Vec<Box<dyn LocationProvider>>,
    settings: SearchSettings,
}

#[derive(Debug, Default)]
pub struct AggregatorBuilder {
    providers: Vec<Box<dyn LocationProvider>>,
    settings: SearchSettings,
}

impl AggregatorBuilder {
    pub fn provider(mut self, provider: Box<dyn LocationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Aggregator {
        let (fallbacks, mut structured): (Vec<_>, Vec<_>) = self
            .providers
            .into_iter()
            .partition(|p| p.tier() == Tier::Generative);
        // Stable: same-tier providers keep registration order.
        structured.sort_by_key(|p| p.tier());

        Aggregator {
            structured,
            fallbacks,
            settings: self.settings,
        }
    }
}

impl Aggregator {
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// The standard provider chain, skipping providers that have no key.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::builder().settings(config.search.clone());

        for &id in ProviderId::all() {
            if !config.is_provider_configured(id) {
                info!(provider = %id, "provider has no API key, leaving it out");
                continue;
            }
            match provider_from_config(id, config) {
                Ok(provider) => builder = builder.provider(provider),
                Err(err) => warn!(provider = %id, error = %err, "could not build provider"),
            }
        }

        builder.build()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.structured
            .iter()
            .chain(&self.fallbacks)
            .map(|p| p.id())
            .collect()
    }

    /// Resolve free text to a ranked list of places. Never fails: every
    /// problem upstream degrades to fewer (or zero) results.
    pub async fn resolve_locations(&self, query: &str) -> AggregatedResult {
        let query = query.trim();
        if query.chars().count() < self.settings.min_query_len {
            debug!(query, "query below minimum length, skipping search");
            return AggregatedResult::empty();
        }

        let timeout = self.settings.provider_timeout();

        let batches = join_all(
            self.structured
                .iter()
                .map(|p| search_with_timeout(p.as_ref(), query, timeout)),
        )
        .await;
        let mut candidates = plausible(batches.into_iter().flatten().collect());

        if candidates.is_empty() && self.settings.generative_fallback {
            for provider in &self.fallbacks {
                debug!(
                    provider = %provider.id(),
                    query,
                    "structured providers empty, trying fallback"
                );
                candidates =
                    plausible(search_with_timeout(provider.as_ref(), query, timeout).await);
                if !candidates.is_empty() {
                    break;
                }
            }
        }

        let mut results = dedup_candidates(candidates, &self.settings.dedup);
        results.truncate(self.settings.max_results);

        debug!(query, count = results.len(), "search resolved");
        AggregatedResult { results }
    }
}

async fn search_with_timeout(
    provider: &dyn LocationProvider,
    query: &str,
    timeout: Duration,
) -> Vec<LocationCandidate> {
    match tokio::time::timeout(timeout, provider.search(query)).await {
        Ok(candidates) => candidates,
        Err(_) => {
            warn!(
                provider = %provider.id(),
                timeout_secs = timeout.as_secs(),
                "provider timed out"
            );
            Vec::new()
        }
    }
}

fn plausible(candidates: Vec<LocationCandidate>) -> Vec<LocationCandidate> {
    let before = candidates.len();
    let kept: Vec<_> = candidates.into_iter().filter(LocationCandidate::is_plausible).collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), "dropped implausible candidates");
    }
    kept
}

/// Keep the first candidate of every group of nearby places.
///
/// Input order is priority order, so the most trusted provider's entry
/// survives. Quadratic in the number of kept candidates, which stays small.
pub fn dedup_candidates(
    candidates: Vec<LocationCandidate>,
    rule: &DedupRule,
) -> Vec<LocationCandidate> {
    let mut kept: Vec<LocationCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let coordinate = candidate.coordinate();
        if let Some(existing) = kept.iter().find(|k| rule.matches(k.coordinate(), coordinate)) {
            debug!(
                dropped = %candidate.source_id,
                kept = %existing.source_id,
                "duplicate location"
            );
            continue;
        }
        kept.push(candidate);
    }

    kept
}
