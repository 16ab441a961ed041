//! Shape of the weather data the forecast provider hands to the UI.
//!
//! Field names follow the provider's `forecast.json` payload. A snapshot is
//! fetched fresh for every location change and never modified afterwards;
//! everything the UI derives from it goes through `&self` methods.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::classify::{
    AqiLevel, Beaufort, Pollutant, PollutantLevel, UvLevel, classify_aqi, classify_beaufort,
    classify_pollutant, classify_uv, wind_cardinal,
};
use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: SnapshotLocation,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

impl WeatherSnapshot {
    /// Chronological forecast days, today first.
    pub fn forecast_days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }

    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast_days().first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Local wall-clock time, `YYYY-MM-DD H:MM`.
    pub localtime: String,
}

impl SnapshotLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.localtime, "%Y-%m-%d %H:%M").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub code: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub wind_degree: f64,
    pub humidity: u8,
    pub pressure_mb: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub cloud: u8,
    pub precip_mm: f64,
    pub condition: Condition,
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

impl CurrentConditions {
    pub fn beaufort(&self) -> Beaufort {
        classify_beaufort(self.wind_kph)
    }

    pub fn uv_level(&self) -> UvLevel {
        classify_uv(self.uv)
    }

    pub fn wind_cardinal(&self) -> &'static str {
        wind_cardinal(self.wind_degree)
    }

    /// `Unknown` when the provider sent no air-quality block.
    pub fn air_quality_level(&self) -> AqiLevel {
        self.air_quality
            .as_ref()
            .map_or_else(|| classify_aqi(0), AirQuality::level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    #[serde(rename = "us-epa-index", alias = "us_epa_index")]
    pub us_epa_index: i64,
}

impl AirQuality {
    pub fn level(&self) -> AqiLevel {
        classify_aqi(self.us_epa_index)
    }

    pub fn pm2_5_level(&self) -> PollutantLevel {
        classify_pollutant(Pollutant::Pm2_5, self.pm2_5)
    }

    pub fn pm10_level(&self) -> PollutantLevel {
        classify_pollutant(Pollutant::Pm10, self.pm10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
    /// 24 entries, midnight first.
    #[serde(default)]
    pub hour: Vec<HourEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    #[serde(default)]
    pub avgtemp_c: f64,
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    /// Local time such as `06:42 AM`.
    pub sunrise: String,
    pub sunset: String,
}

impl Astro {
    pub fn sunrise_time(&self) -> Option<NaiveTime> {
        parse_clock(&self.sunrise)
    }

    pub fn sunset_time(&self) -> Option<NaiveTime> {
        parse_clock(&self.sunset)
    }

    /// Daylight length; `None` when either time is missing (polar day/night
    /// reports come through as "No sunrise").
    pub fn daylight(&self) -> Option<chrono::Duration> {
        Some(self.sunset_time()? - self.sunrise_time()?)
    }
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%I:%M %p").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourEntry {
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub precip_mm: f64,
    pub humidity: u8,
    #[serde(default)]
    pub chance_of_rain: u8,
}
