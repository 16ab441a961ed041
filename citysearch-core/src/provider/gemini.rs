//! Last-resort place lookup through a text-completion model.
//!
//! The model is asked for a JSON array of guesses. Models like to wrap JSON
//! in prose or code fences, so the array is cut out of the reply before
//! parsing, and the whole reply is discarded if that fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
    LocationCandidate,
    error::{ProviderError, truncate_body},
};

use super::{LocationProvider, ProviderId};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const PROVIDER: ProviderId = ProviderId::Gemini;
pub const MAX_GUESSES: usize = 5;

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn prompt(query: &str) -> String {
        format!(
            "Find the latitude and longitude for the place: \"{query}\". \
             Reply with ONLY a JSON array in this format: \
             [{{\"name\":\"City Name\",\"region\":\"State\",\"country\":\"Country\",\"lat\":number,\"lon\":number}}]. \
             Return at most {MAX_GUESSES} matches. If nothing matches, return []."
        )
    }
}

#[derive(Debug, Deserialize)]
struct GmResponse {
    #[serde(default)]
    candidates: Vec<GmCandidate>,
}

#[derive(Debug, Deserialize)]
struct GmCandidate {
    content: Option<GmContent>,
}

#[derive(Debug, Deserialize)]
struct GmContent {
    #[serde(default)]
    parts: Vec<GmPart>,
}

#[derive(Debug, Deserialize)]
struct GmPart {
    text: Option<String>,
}

impl GmResponse {
    fn first_text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GuessedPlace {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

/// Slice from the first `[` to the last `]`, if there is one.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_guesses(text: &str) -> Result<Vec<LocationCandidate>, ProviderError> {
    let array = extract_json_array(text).ok_or(ProviderError::NoJsonArray { provider: PROVIDER })?;

    let guesses: Vec<GuessedPlace> =
        serde_json::from_str(array).map_err(|source| ProviderError::Parse {
            provider: PROVIDER,
            source,
        })?;

    Ok(guesses
        .into_iter()
        .take(MAX_GUESSES)
        .enumerate()
        .map(|(i, g)| LocationCandidate {
            name: g.name,
            region: g.region,
            country: g.country,
            latitude: g.lat,
            longitude: g.lon,
            source_id: format!("{PROVIDER}:{i}"),
        })
        .collect())
}

#[async_trait]
impl LocationProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(query) }] }]
        });

        let res = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::http(PROVIDER, source))?;

        let status = res.status();
        let text = res.text().await.map_err(|source| ProviderError::http(PROVIDER, source))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&text),
            });
        }

        let parsed: GmResponse = serde_json::from_str(&text).map_err(|source| ProviderError::Parse {
            provider: PROVIDER,
            source,
        })?;

        parse_guesses(parsed.first_text())
    }
}
