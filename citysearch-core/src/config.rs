use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::PathBuf, time::Duration};

use crate::{geo::DedupRule, provider::ProviderId};

/// Environment variables that add a key for a provider at load time.
const ENV_KEYS: &[(ProviderId, &str)] = &[
    (ProviderId::WeatherApi, "WEATHER_API_KEY"),
    (ProviderId::Gemini, "GEMINI_API_KEY"),
];

/// Configuration for a single provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Tried in order; later keys are used when earlier ones are rejected.
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Override the upstream base URL (self-hosted mirrors, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name, only meaningful for the generative provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Tuning knobs for the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Queries shorter than this (in characters, after trimming) are not sent upstream.
    pub min_query_len: usize,
    pub max_results: usize,
    pub provider_timeout_secs: u64,
    /// Ask the generative provider when structured providers find nothing.
    pub generative_fallback: bool,
    /// Must stay the last field: TOML tables follow plain values.
    pub dedup: DedupRule,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: 1,
            max_results: 15,
            provider_timeout_secs: 8,
            generative_fallback: true,
            dedup: DedupRule::default(),
        }
    }
}

impl SearchSettings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.min_query_len) {
            bail!("search.min_query_len must be between 1 and 10, got {}", self.min_query_len);
        }
        if !(1..=100).contains(&self.max_results) {
            bail!("search.max_results must be between 1 and 100, got {}", self.max_results);
        }
        if !(1..=60).contains(&self.provider_timeout_secs) {
            bail!(
                "search.provider_timeout_secs must be between 1 and 60, got {}",
                self.provider_timeout_secs
            );
        }
        if !self.dedup.is_valid() {
            bail!("search.dedup threshold must be a positive number, got {:?}", self.dedup);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8787 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [providers.weatherapi]
/// api_keys = ["...", "..."]
///
/// [search]
/// max_results = 10
///
/// [search.dedup]
/// rule = "haversine"
/// km = 10.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

impl Config {
    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk (or defaults on first run), then apply
    /// environment keys and validate.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config file without touching the environment.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citysearch", "citysearch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        for name in self.providers.keys() {
            ProviderId::try_from(name.as_str())
                .with_context(|| format!("Invalid [providers.{name}] section"))?;
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        for (id, var) in ENV_KEYS {
            if let Ok(key) = env::var(var) {
                self.add_provider_api_key(*id, key);
            }
        }
    }

    /// Append a key unless it is blank or already present.
    pub fn add_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return;
        }
        let entry = self.providers.entry(provider_id.as_str().to_string()).or_default();
        if !entry.api_keys.contains(&api_key) {
            entry.api_keys.push(api_key);
        }
    }

    /// Set/replace a provider's keys with a single key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        let entry = self.providers.entry(provider_id.as_str().to_string()).or_default();
        entry.api_keys = vec![api_key];
    }

    /// Returns the API keys for a provider, possibly empty.
    pub fn provider_api_keys(&self, provider_id: ProviderId) -> &[String] {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_keys.as_slice())
            .unwrap_or_default()
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || !self.provider_api_keys(provider_id).is_empty()
    }
}
