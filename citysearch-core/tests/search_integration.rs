//! End-to-end searches against mocked upstreams for all three providers.

use citysearch_core::{
    Aggregator, Config, ProviderConfig, ProviderId,
    provider::{
        gemini::GeminiProvider, openmeteo::OpenMeteoProvider, weatherapi::WeatherApiProvider,
    },
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash-exp:generateContent";

struct Upstreams {
    weatherapi: MockServer,
    openmeteo: MockServer,
    gemini: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            weatherapi: MockServer::start().await,
            openmeteo: MockServer::start().await,
            gemini: MockServer::start().await,
        }
    }

    fn aggregator(&self) -> Aggregator {
        Aggregator::builder()
            // Registered out of order: the aggregator sorts by tier.
            .provider(Box::new(
                GeminiProvider::new("GKEY".into()).with_base_url(self.gemini.uri()),
            ))
            .provider(Box::new(OpenMeteoProvider::new().with_base_url(self.openmeteo.uri())))
            .provider(Box::new(
                WeatherApiProvider::new(vec!["WKEY".into()]).with_base_url(self.weatherapi.uri()),
            ))
            .build()
    }

    async fn weatherapi_replies(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/search.json"))
            .and(query_param("key", "WKEY"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.weatherapi)
            .await;
    }

    async fn openmeteo_replies(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.openmeteo)
            .await;
    }

    async fn gemini_replies(&self, text: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .and(query_param("key", "GKEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": text }] } }]
            })))
            .expect(expected_calls)
            .mount(&self.gemini)
            .await;
    }
}

fn springfields_weatherapi() -> Value {
    json!([
        {"id": 1, "name": "Springfield", "region": "Illinois", "country": "United States of America", "lat": 39.80, "lon": -89.64},
        {"id": 2, "name": "Springfield", "region": "Missouri", "country": "United States of America", "lat": 37.22, "lon": -93.30}
    ])
}

fn springfields_openmeteo() -> Value {
    json!({
        "results": [
            {"id": 10, "name": "Springfield", "admin1": "Illinois", "country": "United States", "latitude": 39.80172, "longitude": -89.64371},
            {"id": 11, "name": "Springfield", "admin1": "Massachusetts", "country": "United States", "latitude": 42.10148, "longitude": -72.58981}
        ]
    })
}

#[tokio::test]
async fn merges_providers_and_drops_cross_provider_duplicates() {
    let up = Upstreams::start().await;
    up.weatherapi_replies(200, springfields_weatherapi()).await;
    up.openmeteo_replies(200, springfields_openmeteo()).await;
    up.gemini_replies("[]", 0).await;

    let result = up.aggregator().resolve_locations("Springfield").await;

    let regions: Vec<_> = result.results.iter().map(|c| c.region.as_str()).collect();
    assert_eq!(regions, ["Illinois", "Missouri", "Massachusetts"]);
    // The Illinois duplicate keeps the primary provider's entry.
    assert_eq!(result.results[0].source_id, "weatherapi:1");
    assert_eq!(result.results[0].country, "United States of America");
}

#[tokio::test]
async fn falls_back_to_generative_when_structured_find_nothing() {
    let up = Upstreams::start().await;
    up.weatherapi_replies(200, json!([])).await;
    up.openmeteo_replies(200, json!({"generationtime_ms": 0.4})).await;
    up.gemini_replies(
        "Here you go:\n```json\n[{\"name\":\"Ushuaia\",\"region\":\"Tierra del Fuego\",\"country\":\"Argentina\",\"lat\":-54.8,\"lon\":-68.3}]\n```",
        1,
    )
    .await;

    let result = up.aggregator().resolve_locations("end of the world city").await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.results[0].name, "Ushuaia");
    assert_eq!(result.results[0].source_id, "gemini:0");
}

#[tokio::test]
async fn upstream_errors_are_treated_as_empty() {
    let up = Upstreams::start().await;
    up.weatherapi_replies(500, json!({"error": {"code": 9999, "message": "Internal"}})).await;
    up.openmeteo_replies(503, json!({"reason": "maintenance"})).await;
    up.gemini_replies(
        "[{\"name\":\"Paris\",\"country\":\"France\",\"lat\":48.8566,\"lon\":2.3522}]",
        1,
    )
    .await;

    let result = up.aggregator().resolve_locations("Paris").await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.results[0].country, "France");
}

#[tokio::test]
async fn gibberish_resolves_to_nothing() {
    let up = Upstreams::start().await;
    up.weatherapi_replies(200, json!([])).await;
    up.openmeteo_replies(200, json!({})).await;
    up.gemini_replies("I could not find a place called that.", 1).await;

    let result = up.aggregator().resolve_locations("xzqplk123").await;

    assert!(result.is_empty());
}

#[tokio::test]
async fn from_config_honours_base_url_overrides() {
    let up = Upstreams::start().await;
    up.weatherapi_replies(
        200,
        json!([{"id": 7, "name": "London", "region": "City of London, Greater London", "country": "United Kingdom", "lat": 51.52, "lon": -0.11}]),
    )
    .await;
    up.openmeteo_replies(
        200,
        json!({"results": [{"id": 2643743, "name": "London", "admin1": "England", "country": "United Kingdom", "latitude": 51.50853, "longitude": -0.12574}]}),
    )
    .await;

    let mut config = Config::default();
    config.providers.insert(
        ProviderId::WeatherApi.to_string(),
        ProviderConfig {
            api_keys: vec!["WKEY".into()],
            base_url: Some(up.weatherapi.uri()),
            model: None,
        },
    );
    config.providers.insert(
        ProviderId::OpenMeteo.to_string(),
        ProviderConfig {
            base_url: Some(up.openmeteo.uri()),
            ..ProviderConfig::default()
        },
    );

    let aggregator = Aggregator::from_config(&config);
    assert_eq!(aggregator.provider_ids(), [ProviderId::WeatherApi, ProviderId::OpenMeteo]);

    let result = aggregator.resolve_locations("London").await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.results[0].source_id, "weatherapi:7");
}
