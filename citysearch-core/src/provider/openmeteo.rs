use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    LocationCandidate,
    error::{ProviderError, truncate_body},
};

use super::{LocationProvider, ProviderId};

const DEFAULT_BASE_URL: &str = "https://geocoding-api.open-meteo.com";
const PROVIDER: ProviderId = ProviderId::OpenMeteo;
const RESULT_COUNT: &str = "10";

/// Open-Meteo geocoding. Free, keyless, medium trust.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
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
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    /// Absent entirely when nothing matched.
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    id: Option<i64>,
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
}

impl OmPlace {
    fn into_candidate(self, index: usize) -> LocationCandidate {
        let id = self.id.map_or_else(|| index.to_string(), |id| id.to_string());
        LocationCandidate {
            name: self.name,
            region: self.admin1.or(self.admin2).unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            latitude: self.latitude,
            longitude: self.longitude,
            source_id: format!("{PROVIDER}:{id}"),
        }
    }
}

#[async_trait]
impl LocationProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError> {
        let url = format!("{}/v1/search", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", query),
                ("count", RESULT_COUNT),
                ("language", "en"),
                ("format", "json"),
            ])
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

        let parsed: OmResponse = serde_json::from_str(&body).map_err(|source| ProviderError::Parse {
            provider: PROVIDER,
            source,
        })?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, place)| place.into_candidate(i))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn maps_admin_levels_into_region() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Springfield"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "id": 4250542,
                        "name": "Springfield",
                        "latitude": 39.80172,
                        "longitude": -89.64371,
                        "country": "United States",
                        "admin1": "Illinois",
                        "admin2": "Sangamon"
                    },
                    {
                        "id": 4409896,
                        "name": "Springfield",
                        "latitude": 37.21533,
                        "longitude": -93.29824,
                        "country": "United States",
                        "admin2": "Greene"
                    }
                ],
                "generationtime_ms": 0.9
            })))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new().with_base_url(server.uri());
        let candidates = provider.fetch("Springfield").await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].region, "Illinois");
        assert_eq!(candidates[1].region, "Greene");
        assert_eq!(candidates[0].source_id, "openmeteo:4250542");
        assert_eq!(candidates[1].longitude, -93.29824);
    }

    #[tokio::test]
    async fn missing_results_means_no_matches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"generationtime_ms": 0.3})),
            )
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new().with_base_url(server.uri());
        assert!(provider.fetch("xzqplk123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_degrades_to_empty_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new().with_base_url(server.uri());
        assert!(matches!(
            provider.fetch("Lon").await,
            Err(ProviderError::Status { .. })
        ));
        assert!(provider.search("Lon").await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_http_error() {
        // Nothing listens on port 9 on a test machine.
        let provider = OpenMeteoProvider::new().with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            provider.fetch("Lon").await,
            Err(ProviderError::Http { .. })
        ));
    }
}
