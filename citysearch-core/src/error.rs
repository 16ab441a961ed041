use thiserror::Error;

use crate::provider::ProviderId;

/// Failure of a single upstream call made by a provider adapter.
///
/// These never leave the crate's search path: `LocationProvider::search`
/// logs them and degrades to an empty candidate list.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Http {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} responded with status {status}: {body}")]
    Status {
        provider: ProviderId,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {provider} response: {source}")]
    Parse {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} response contained no JSON array")]
    NoJsonArray { provider: ProviderId },

    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: ProviderId },
}

impl ProviderError {
    /// Transport failure. The request URL is dropped from `source`: it carries
    /// the API key as a query parameter.
    pub(crate) fn http(provider: ProviderId, source: reqwest::Error) -> Self {
        Self::Http {
            provider,
            source: source.without_url(),
        }
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Http { provider, .. }
            | Self::Status { provider, .. }
            | Self::Parse { provider, .. }
            | Self::NoJsonArray { provider }
            | Self::MissingApiKey { provider } => *provider,
        }
    }
}

/// Shorten an upstream body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
