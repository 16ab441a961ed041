use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use citysearch_core::{
    AggregatedResult, Aggregator, Config, ProviderId, classify_aqi, classify_beaufort, classify_uv,
    server, wind_cardinal,
};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citysearch", version, about = "Multi-provider city search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "weatherapi", "openmeteo" or "gemini".
        provider: String,
    },

    /// Resolve a place name to candidate locations.
    Search {
        /// Free-text place name.
        query: String,

        /// Print the raw `{"results": [...]}` document.
        #[arg(long)]
        json: bool,
    },

    /// Turn a raw reading into its display label.
    Classify {
        #[command(subcommand)]
        reading: Reading,
    },

    /// Run the HTTP search endpoint.
    Serve {
        /// Port to listen on; defaults to `server.port` from the config.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Subcommand)]
pub enum Reading {
    /// US-EPA air quality index (1-6).
    Aqi {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// UV index.
    Uv {
        #[arg(allow_negative_numbers = true)]
        index: f64,
    },
    /// Wind speed in km/h, optionally with a bearing.
    Wind {
        kph: f64,
        #[arg(long, allow_negative_numbers = true)]
        degrees: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Search { query, json } => {
                let config = Config::load()?;
                let aggregator = Aggregator::from_config(&config);
                let result = aggregator.resolve_locations(&query).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_results(&query, &result);
                }
            }
            Command::Classify { reading } => print_reading(&reading),
            Command::Serve { port } => {
                let config = Config::load()?;
                let port = port.unwrap_or(config.server.port);
                let aggregator = Arc::new(Aggregator::from_config(&config));
                server::serve(aggregator, port).await?;
            }
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    if !id.requires_api_key() {
        println!("Provider '{id}' needs no API key.");
        return Ok(());
    }

    let path = Config::config_file_path()?;
    // Read the file only: keys coming from the environment must not be persisted.
    let mut config = Config::load_from(&path)?;

    let key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, key.to_string());
    config.save()?;

    info!(provider = %id, path = %path.display(), "saved API key");
    println!("Saved API key for '{id}' to {}", path.display());
    Ok(())
}

fn print_results(query: &str, result: &AggregatedResult) {
    if result.is_empty() {
        println!("No places found for '{query}'.");
        return;
    }

    for (i, place) in result.results.iter().enumerate() {
        println!(
            "{:>2}. {} ({:.4}, {:.4})  [{}]",
            i + 1,
            place.display_name(),
            place.latitude,
            place.longitude,
            place.source_id
        );
    }
}

fn print_reading(reading: &Reading) {
    match *reading {
        Reading::Aqi { index } => {
            let level = classify_aqi(index);
            println!("{}: {}", level.label, level.advice());
        }
        Reading::Uv { index } => println!("{}", classify_uv(index).label),
        Reading::Wind { kph, degrees } => {
            let force = classify_beaufort(kph);
            match degrees {
                Some(deg) => println!(
                    "Force {} ({}) from {}",
                    force.scale,
                    force.description,
                    wind_cardinal(deg)
                ),
                None => println!("Force {} ({})", force.scale, force.description),
            }
        }
    }
}
