use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    dates::from_unix_timestamp,
    error::PipelineError,
    model::{AirQualityReading, Coordinate, ForecastEntry, LocationQuery, TimeRange, WeatherSnapshot},
    transport::{HttpTransport, Transport},
};

use super::{DataFetcher, Geocoder};

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const WEATHER_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const AIR_POLLUTION_PATH: &str = "/data/2.5/air_pollution";
const AIR_POLLUTION_HISTORY_PATH: &str = "/data/2.5/air_pollution/history";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient<T = HttpTransport> {
    api_key: String,
    transport: T,
}

impl<T: Transport> OpenWeatherClient<T> {
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Self {
        Self { api_key: api_key.into(), transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get(&self, path: &str, mut query: Vec<(&str, String)>) -> Result<Value, PipelineError> {
        query.push(("appid", self.api_key.clone()));
        self.transport.get_json(path, &query).await
    }
}

fn coordinate_params(at: Coordinate) -> Vec<(&'static str, String)> {
    vec![("lat", at.lat.to_string()), ("lon", at.lon.to_string())]
}

/// Decodes a payload whose shape must match `D`; mismatches are upstream errors.
fn decode<D: DeserializeOwned>(value: Value, what: &str) -> Result<D, PipelineError> {
    let detail = upstream_detail(&value);
    serde_json::from_value(value).map_err(|err| {
        warn!(what, error = %err, "unexpected payload");
        PipelineError::Upstream(match detail {
            Some(detail) => format!("{what}: {detail}"),
            None => format!("{what}: {err}"),
        })
    })
}

/// `cod`/`message` the service embeds in failure payloads.
fn upstream_detail(value: &Value) -> Option<String> {
    let message = value.get("message").and_then(Value::as_str)?;
    match value.get("cod") {
        Some(Value::String(cod)) => Some(format!("cod {cod}: {message}")),
        Some(Value::Number(cod)) => Some(format!("cod {cod}: {message}")),
        _ => Some(message.to_string()),
    }
}

fn timestamp(dt: i64, what: &str) -> Result<chrono::DateTime<chrono::Utc>, PipelineError> {
    from_unix_timestamp(dt)
        .ok_or_else(|| PipelineError::Upstream(format!("{what}: timestamp {dt} out of range")))
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwCurrentMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAirMain {
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    dt: i64,
    main: OwAirMain,
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    list: Vec<OwAirEntry>,
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = PipelineError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let weather = entry
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Upstream(format!("forecast slot {} has no weather", entry.dt)))?;

        Ok(ForecastEntry {
            timestamp: timestamp(entry.dt, "forecast")?,
            label: entry.dt_txt,
            temperature_c: entry.main.temp,
            description: weather.description,
            icon: weather.icon,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
        })
    }
}

impl TryFrom<OwAirEntry> for AirQualityReading {
    type Error = PipelineError;

    fn try_from(entry: OwAirEntry) -> Result<Self, Self::Error> {
        Ok(AirQualityReading {
            timestamp: timestamp(entry.dt, "air quality")?,
            aqi: entry.main.aqi,
            components: entry.components,
        })
    }
}

#[async_trait]
impl<T: Transport> Geocoder for OpenWeatherClient<T> {
    async fn resolve(&self, query: &LocationQuery) -> Result<Coordinate, PipelineError> {
        let value = self
            .get(GEOCODE_PATH, vec![("q", query.geocode_term()), ("limit", "1".to_string())])
            .await?;

        let detail = upstream_detail(&value);
        let candidates: Vec<OwGeoCandidate> = serde_json::from_value(value).map_err(|err| {
            PipelineError::Network(format!(
                "failed to parse geocoding response: {}",
                detail.unwrap_or_else(|| err.to_string())
            ))
        })?;

        let best = candidates.into_iter().next().ok_or_else(|| {
            debug!(%query, "geocoding returned no candidates");
            PipelineError::NotFound
        })?;

        info!(%query, lat = best.lat, lon = best.lon, "resolved location");
        Ok(Coordinate { lat: best.lat, lon: best.lon })
    }
}

#[async_trait]
impl<T: Transport> DataFetcher for OpenWeatherClient<T> {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, PipelineError> {
        let mut params = coordinate_params(at);
        params.push(("units", "metric".to_string()));

        let value = self.get(WEATHER_PATH, params).await?;
        let parsed: OwCurrentResponse = decode(value, "current weather")?;

        let weather = parsed.weather.into_iter().next().ok_or_else(|| {
            PipelineError::Upstream("current weather: no weather condition in payload".into())
        })?;

        Ok(WeatherSnapshot {
            temperature_c: parsed.main.temp,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
            country: parsed.sys.country,
        })
    }

    async fn forecast(&self, at: Coordinate) -> Result<Vec<ForecastEntry>, PipelineError> {
        let mut params = coordinate_params(at);
        params.push(("units", "metric".to_string()));

        let value = self.get(FORECAST_PATH, params).await?;

        // Success is the string "200"; failures carry other codes.
        if value.get("cod").and_then(Value::as_str) != Some("200") {
            let detail = upstream_detail(&value)
                .unwrap_or_else(|| format!("unexpected cod {}", value.get("cod").unwrap_or(&Value::Null)));
            warn!(%detail, "forecast request flagged as failed");
            return Err(PipelineError::Upstream(format!("forecast: {detail}")));
        }

        let parsed: OwForecastResponse = decode(value, "forecast")?;
        parsed.list.into_iter().map(ForecastEntry::try_from).collect()
    }

    async fn air_quality(
        &self,
        at: Coordinate,
        range: Option<TimeRange>,
    ) -> Result<Vec<AirQualityReading>, PipelineError> {
        let mut params = coordinate_params(at);

        let path = match range {
            Some(range) => {
                params.push(("start", range.start.to_string()));
                params.push(("end", range.end.to_string()));
                AIR_POLLUTION_HISTORY_PATH
            }
            None => AIR_POLLUTION_PATH,
        };

        let value = self.get(path, params).await?;
        let parsed: OwAirResponse = decode(value, "air quality")?;

        let mut readings = parsed
            .list
            .into_iter()
            .map(AirQualityReading::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if range.is_none() {
            readings.truncate(1);
            if readings.is_empty() {
                return Err(PipelineError::Upstream("air quality: empty reading list".into()));
            }
        }

        Ok(readings)
    }
}
