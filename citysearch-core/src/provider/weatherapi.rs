use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    LocationCandidate,
    error::{ProviderError, truncate_body},
};

use super::{LocationProvider, ProviderId};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";
const PROVIDER: ProviderId = ProviderId::WeatherApi;

/// WeatherAPI.com place search. Highest trust tier.
///
/// Holds an ordered list of API keys; a key that gets a non-2xx reply (quota,
/// revoked) is skipped in favour of the next one for the same request.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_keys: Vec<String>,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn search_with_key(&self, key: &str, query: &str) -> Result<Vec<WaPlace>, ProviderError> {
        let url = format!("{}/v1/search.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", key), ("q", query)])
            .send()
            .await
            .map_err(|source| ProviderError::http(PROVIDER, source))?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::http(PROVIDER, source))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Parse {
            provider: PROVIDER,
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaPlace {
    id: Option<i64>,
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl WaPlace {
    fn into_candidate(self, index: usize) -> LocationCandidate {
        let id = self.id.map_or_else(|| index.to_string(), |id| id.to_string());
        LocationCandidate {
            name: self.name,
            region: self.region,
            country: self.country,
            latitude: self.lat,
            longitude: self.lon,
            source_id: format!("{PROVIDER}:{id}"),
        }
    }
}

#[async_trait]
impl LocationProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError> {
        let mut last_err = None;

        for (attempt, key) in self.api_keys.iter().enumerate() {
            match self.search_with_key(key, query).await {
                Ok(places) => {
                    return Ok(places
                        .into_iter()
                        .enumerate()
                        .map(|(i, place)| place.into_candidate(i))
                        .collect());
                }
                Err(err @ ProviderError::Status { .. }) => {
                    debug!(attempt, error = %err, "weatherapi key rejected, trying next key");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or(ProviderError::MissingApiKey { provider: PROVIDER }))
    }
}
