use crate::{
    Config, LocationCandidate,
    error::ProviderError,
    provider::{
        gemini::GeminiProvider, openmeteo::OpenMeteoProvider, weatherapi::WeatherApiProvider,
    },
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};
use tracing::{debug, warn};

pub mod gemini;
pub mod openmeteo;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherApi,
    OpenMeteo,
    Gemini,
}

/// Trust ordering of providers. Lower sorts first and wins duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Primary,
    Secondary,
    /// Only consulted when every structured provider came back empty.
    Generative,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::Gemini => "gemini",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherApi, ProviderId::OpenMeteo, ProviderId::Gemini]
    }

    pub fn tier(&self) -> Tier {
        match self {
            ProviderId::WeatherApi => Tier::Primary,
            ProviderId::OpenMeteo => Tier::Secondary,
            ProviderId::Gemini => Tier::Generative,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderId::OpenMeteo)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherapi, openmeteo, gemini."
            )),
        }
    }
}

/// One upstream place-search service normalized to [`LocationCandidate`].
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    fn tier(&self) -> Tier {
        self.id().tier()
    }

    /// The raw upstream call.
    async fn fetch(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError>;

    /// Fail-soft search: any error is logged and becomes an empty list.
    async fn search(&self, query: &str) -> Vec<LocationCandidate> {
        match self.fetch(query).await {
            Ok(candidates) => {
                debug!(
                    provider = %self.id(),
                    count = candidates.len(),
                    "provider returned candidates"
                );
                candidates
            }
            Err(err) => {
                warn!(provider = %self.id(), error = %err, "provider search failed");
                Vec::new()
            }
        }
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn LocationProvider>> {
    let keys = config.provider_api_keys(id);
    if id.requires_api_key() && keys.is_empty() {
        return Err(anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `citysearch configure {id}` and enter your API key."
        ));
    }

    let settings = config.provider_config(id);
    let base_url = settings.and_then(|p| p.base_url.clone());

    let boxed: Box<dyn LocationProvider> = match id {
        ProviderId::WeatherApi => {
            let mut p = WeatherApiProvider::new(keys.to_vec());
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Box::new(p)
        }
        ProviderId::OpenMeteo => {
            let mut p = OpenMeteoProvider::new();
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Box::new(p)
        }
        ProviderId::Gemini => {
            let key = keys
                .first()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("No API key configured for provider '{id}'."))?;
            let mut p = GeminiProvider::new(key);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            if let Some(model) = settings.and_then(|s| s.model.clone()) {
                p = p.with_model(model);
            }
            Box::new(p)
        }
    };

    Ok(boxed)
}
