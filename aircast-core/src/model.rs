use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    classify::{self, SeverityInfo},
    dates,
    error::PipelineError,
};

/// A place as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    /// ISO-3166 alpha-2 code, e.g. "BR".
    pub country_code: Option<String>,
}

impl LocationQuery {
    pub fn new(city: impl Into<String>, country_code: Option<String>) -> Self {
        let city = city.into().trim().to_string();
        let country_code = country_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Self { city, country_code }
    }

    /// The `q` parameter sent to the geocoding endpoint.
    pub fn geocode_term(&self) -> String {
        match &self.country_code {
            Some(cc) => format!("{},{}", self.city, cc),
            None => self.city.clone(),
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.country_code {
            Some(cc) => write!(f, "{}, {}", self.city, cc),
            None => f.write_str(&self.city),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    /// Short condition group, e.g. "Clouds".
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub country: String,
}

/// One 3-hour slot of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// Upstream `dt_txt`, e.g. "2024-01-01 12:00:00".
    pub label: String,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

impl ForecastEntry {
    pub fn icon_url(&self) -> String {
        format!("http://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// One air-pollution sample. Concentrations are in µg/m³ keyed by the
/// upstream component symbol (co, no, no2, o3, so2, pm2_5, pm10, nh3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub timestamp: DateTime<Utc>,
    pub aqi: i64,
    pub components: BTreeMap<String, f64>,
}

impl AirQualityReading {
    pub fn severity(&self) -> SeverityInfo {
        classify::aqi_severity(self.aqi)
    }

    /// Tier (1..=5) of every component, in component-symbol order.
    pub fn pollutant_levels(&self) -> Vec<(&str, f64, u8)> {
        self.components
            .iter()
            .map(|(symbol, value)| {
                (symbol.as_str(), *value, classify::pollutant_level(symbol, *value))
            })
            .collect()
    }
}

/// History window in Unix seconds. Both ends are UTC midnights, so the
/// day named by `end` itself is not covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// Builds a range from two `YYYY-MM-DD` dates, each taken at UTC midnight.
    /// Equal dates give an empty window.
    pub fn from_dates(start: &str, end: &str) -> Result<Self, PipelineError> {
        let start_ts = dates::to_unix_timestamp(start)?;
        let end_ts = dates::to_unix_timestamp(end)?;

        if end_ts < start_ts {
            return Err(PipelineError::InvalidDate(format!(
                "end date {end} is before start date {start}"
            )));
        }

        Ok(Self { start: start_ts, end: end_ts })
    }
}

/// Pollutants with a severity breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    So2,
    No2,
    Pm10,
    Pm2_5,
    O3,
    Co,
}

impl Pollutant {
    pub fn symbol(&self) -> &'static str {
        match self {
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm2_5 => "PM2_5",
            Pollutant::O3 => "O3",
            Pollutant::Co => "CO",
        }
    }

    pub const fn all() -> &'static [Pollutant] {
        &[
            Pollutant::So2,
            Pollutant::No2,
            Pollutant::Pm10,
            Pollutant::Pm2_5,
            Pollutant::O3,
            Pollutant::Co,
        ]
    }

    /// Case-insensitive lookup; accepts upstream component keys like "pm2_5".
    pub fn from_symbol(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::all().iter().copied().find(|p| p.symbol() == upper)
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
