use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::PipelineError,
    model::{AirQualityReading, Coordinate, ForecastEntry, LocationQuery, TimeRange, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
    transport::HttpTransport,
};

pub mod openweather;

/// Resolves a free-text place to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Only the best candidate is ever used. Zero candidates is `NotFound`.
    async fn resolve(&self, query: &LocationQuery) -> Result<Coordinate, PipelineError>;
}

/// Retrieves readings for a coordinate. Every call goes to the upstream
/// service; sequences come back in upstream order.
#[async_trait]
pub trait DataFetcher: Send + Sync + Debug {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherSnapshot, PipelineError>;

    async fn forecast(&self, at: Coordinate) -> Result<Vec<ForecastEntry>, PipelineError>;

    /// `None` selects current air quality (a single reading), `Some` the
    /// history for that window.
    async fn air_quality(
        &self,
        at: Coordinate,
        range: Option<TimeRange>,
    ) -> Result<Vec<AirQualityReading>, PipelineError>;
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient<HttpTransport>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `aircast configure` and enter your OpenWeather API key, \
             or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let transport = HttpTransport::new(config.base_url());
    Ok(OpenWeatherClient::with_transport(api_key, transport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = client_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `aircast configure`"));
    }

    #[test]
    fn client_from_config_uses_configured_base_url() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            base_url: Some("http://localhost:9000/".into()),
        };

        let client = client_from_config(&cfg).expect("key is configured");
        assert_eq!(client.transport().base_url(), "http://localhost:9000");
    }
}
