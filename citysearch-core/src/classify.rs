//! Pure lookups from raw readings to human labels: US-EPA air quality index,
//! UV index, pollutant concentrations, Beaufort wind force and compass
//! bearing.

use serde::Serialize;

/// Shared severity scale so the UI can color AQI, UV and pollutant labels
/// the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Good,
    Moderate,
    Elevated,
    High,
    Severe,
    Extreme,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiLevel {
    pub label: &'static str,
    pub tier: SeverityTier,
}

impl AqiLevel {
    /// Health guidance matching the level.
    pub fn advice(&self) -> &'static str {
        match self.tier {
            SeverityTier::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            SeverityTier::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people."
            }
            SeverityTier::Elevated => {
                "Members of sensitive groups may experience health effects. The general public is less likely to be affected."
            }
            SeverityTier::High => {
                "Some members of the general public may experience health effects; members of sensitive groups may experience more serious health effects."
            }
            SeverityTier::Severe => {
                "Health alert: The risk of health effects is increased for everyone."
            }
            SeverityTier::Extreme => {
                "Health warning of emergency conditions: everyone is more likely to be affected."
            }
            SeverityTier::Unknown => "No air quality reading is available.",
        }
    }
}

/// Classify a US-EPA index (1..=6). Anything else is `Unknown`.
pub fn classify_aqi(epa_index: i64) -> AqiLevel {
    let (label, tier) = match epa_index {
        1 => ("Good", SeverityTier::Good),
        2 => ("Moderate", SeverityTier::Moderate),
        3 => ("Unhealthy (Sensitive)", SeverityTier::Elevated),
        4 => ("Unhealthy", SeverityTier::High),
        5 => ("Very Unhealthy", SeverityTier::Severe),
        6 => ("Hazardous", SeverityTier::Extreme),
        _ => ("Unknown", SeverityTier::Unknown),
    };
    AqiLevel { label, tier }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UvLevel {
    pub label: &'static str,
    pub tier: SeverityTier,
}

/// Banded UV index. NaN fails every band and lands on `Extreme`.
pub fn classify_uv(uv_index: f64) -> UvLevel {
    let (label, tier) = if uv_index <= 2.0 {
        ("Low", SeverityTier::Good)
    } else if uv_index <= 5.0 {
        ("Moderate", SeverityTier::Moderate)
    } else if uv_index <= 7.0 {
        ("High", SeverityTier::Elevated)
    } else if uv_index <= 10.0 {
        ("Very High", SeverityTier::High)
    } else {
        ("Extreme", SeverityTier::Extreme)
    };
    UvLevel { label, tier }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm2_5,
    Pm10,
    Co,
    No2,
    So2,
    O3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollutantLevel {
    pub label: &'static str,
    pub tier: SeverityTier,
}

/// Rough concentration bands (µg/m³). Only particulates are graded; the
/// gases always read `Good`.
pub fn classify_pollutant(pollutant: Pollutant, value: f64) -> PollutantLevel {
    let (label, tier) = match pollutant {
        Pollutant::Pm2_5 if value <= 12.0 => ("Good", SeverityTier::Good),
        Pollutant::Pm2_5 if value <= 35.0 => ("Moderate", SeverityTier::Moderate),
        Pollutant::Pm2_5 if value <= 55.0 => {
            ("Unhealthy for sensitive groups", SeverityTier::Elevated)
        }
        Pollutant::Pm2_5 => ("Unhealthy", SeverityTier::High),
        Pollutant::Pm10 if value <= 54.0 => ("Good", SeverityTier::Good),
        Pollutant::Pm10 if value <= 154.0 => ("Moderate", SeverityTier::Moderate),
        Pollutant::Pm10 => ("Unhealthy", SeverityTier::Elevated),
        Pollutant::Co | Pollutant::No2 | Pollutant::So2 | Pollutant::O3 => {
            ("Good", SeverityTier::Good)
        }
    };
    PollutantLevel { label, tier }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beaufort {
    pub scale: u8,
    pub description: &'static str,
}

const KPH_TO_MPH: f64 = 0.621371;

/// Upper bounds (exclusive, mph) of forces 0..=11; anything above is 12.
const BEAUFORT_BANDS: [(f64, &str); 12] = [
    (1.0, "Calm"),
    (4.0, "Light air"),
    (8.0, "Light breeze"),
    (13.0, "Gentle breeze"),
    (18.0, "Moderate breeze"),
    (25.0, "Fresh breeze"),
    (31.0, "Strong breeze"),
    (39.0, "Near gale"),
    (47.0, "Gale"),
    (55.0, "Strong gale"),
    (64.0, "Storm"),
    (73.0, "Violent storm"),
];

/// Beaufort force for a speed in km/h. A NaN reading counts as no wind.
pub fn classify_beaufort(wind_kph: f64) -> Beaufort {
    if wind_kph.is_nan() {
        return classify_beaufort(0.0);
    }
    let mph = wind_kph * KPH_TO_MPH;
    BEAUFORT_BANDS
        .iter()
        .zip(0u8..)
        .find(|((upper, _), _)| mph < *upper)
        .map_or(
            Beaufort {
                scale: 12,
                description: "Hurricane",
            },
            |(&(_, description), scale)| Beaufort { scale, description },
        )
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass name for a bearing in degrees. Wraps any finite input.
pub fn wind_cardinal(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "N";
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "Good", SeverityTier::Good)]
    #[case(2, "Moderate", SeverityTier::Moderate)]
    #[case(3, "Unhealthy (Sensitive)", SeverityTier::Elevated)]
    #[case(4, "Unhealthy", SeverityTier::High)]
    #[case(5, "Very Unhealthy", SeverityTier::Severe)]
    #[case(6, "Hazardous", SeverityTier::Extreme)]
    #[case(0, "Unknown", SeverityTier::Unknown)]
    #[case(7, "Unknown", SeverityTier::Unknown)]
    #[case(-3, "Unknown", SeverityTier::Unknown)]
    #[case(i64::MAX, "Unknown", SeverityTier::Unknown)]
    fn aqi_levels(#[case] index: i64, #[case] label: &str, #[case] tier: SeverityTier) {
        let level = classify_aqi(index);
        assert_eq!(level.label, label);
        assert_eq!(level.tier, tier);
        assert!(!level.advice().is_empty());
    }

    #[rstest]
    #[case(0.0, "Low")]
    #[case(2.0, "Low")]
    #[case(2.1, "Moderate")]
    #[case(5.0, "Moderate")]
    #[case(6.5, "High")]
    #[case(7.0, "High")]
    #[case(10.0, "Very High")]
    #[case(10.5, "Extreme")]
    #[case(f64::NAN, "Extreme")]
    #[case(-1.0, "Low")]
    fn uv_bands(#[case] uv: f64, #[case] label: &str) {
        assert_eq!(classify_uv(uv).label, label);
    }

    #[rstest]
    #[case(Pollutant::Pm2_5, 8.0, "Good")]
    #[case(Pollutant::Pm2_5, 12.0, "Good")]
    #[case(Pollutant::Pm2_5, 20.0, "Moderate")]
    #[case(Pollutant::Pm2_5, 50.0, "Unhealthy for sensitive groups")]
    #[case(Pollutant::Pm2_5, 90.0, "Unhealthy")]
    #[case(Pollutant::Pm10, 54.0, "Good")]
    #[case(Pollutant::Pm10, 100.0, "Moderate")]
    #[case(Pollutant::Pm10, 200.0, "Unhealthy")]
    #[case(Pollutant::No2, 500.0, "Good")]
    fn pollutant_bands(#[case] pollutant: Pollutant, #[case] value: f64, #[case] label: &str) {
        assert_eq!(classify_pollutant(pollutant, value).label, label);
    }

    #[rstest]
    #[case(0.0, 0, "Calm")]
    #[case(1.5, 0, "Calm")]
    #[case(5.0, 1, "Light air")]
    #[case(10.0, 2, "Light breeze")]
    #[case(20.0, 3, "Gentle breeze")]
    #[case(40.0, 5, "Fresh breeze")]
    #[case(75.0, 8, "Gale")]
    #[case(100.0, 10, "Storm")]
    #[case(110.0, 11, "Violent storm")]
    #[case(120.0, 12, "Hurricane")]
    #[case(400.0, 12, "Hurricane")]
    #[case(f64::NAN, 0, "Calm")]
    #[case(-5.0, 0, "Calm")]
    fn beaufort_scale(#[case] kph: f64, #[case] scale: u8, #[case] description: &str) {
        let b = classify_beaufort(kph);
        assert_eq!(b.scale, scale, "{kph} kph");
        assert_eq!(b.description, description);
    }

    #[test]
    fn beaufort_is_monotonic() {
        let mut previous = 0;
        for tenth_kph in 0..=2000 {
            let scale = classify_beaufort(f64::from(tenth_kph) / 10.0).scale;
            assert!(scale >= previous, "scale dropped at {} kph", f64::from(tenth_kph) / 10.0);
            previous = scale;
        }
        assert_eq!(previous, 12);
    }

    #[test]
    fn beaufort_covers_every_force() {
        let seen: std::collections::BTreeSet<u8> = (0..=2000)
            .map(|tenth_kph| classify_beaufort(f64::from(tenth_kph) / 10.0).scale)
            .collect();
        assert_eq!(seen.len(), 13);
    }

    #[rstest]
    #[case(0.0, "N")]
    #[case(11.0, "N")]
    #[case(12.0, "NNE")]
    #[case(90.0, "E")]
    #[case(200.0, "SSW")]
    #[case(359.0, "N")]
    #[case(360.0, "N")]
    #[case(-90.0, "W")]
    #[case(f64::NAN, "N")]
    fn cardinal_directions(#[case] degrees: f64, #[case] expected: &str) {
        assert_eq!(wind_cardinal(degrees), expected);
    }
}
