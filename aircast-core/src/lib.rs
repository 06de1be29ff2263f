//! Core library for the `aircast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The geocode → fetch pipeline over the OpenWeather API
//! - Severity classification of AQI indices and pollutant concentrations
//! - Shared domain models and the search state a front-end renders
//!
//! It is used by `aircast-cli`, but can also be reused by other binaries or services.

pub mod classify;
pub mod config;
pub mod dates;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod transport;

pub use classify::{Severity, SeverityInfo, aqi_severity, pollutant_level};
pub use config::Config;
pub use error::PipelineError;
pub use model::{
    AirQualityReading, Coordinate, ForecastEntry, LocationQuery, Pollutant, TimeRange,
    WeatherSnapshot,
};
pub use pipeline::{Pipeline, SearchState};
pub use provider::{DataFetcher, Geocoder, client_from_config, openweather::OpenWeatherClient};
pub use transport::{HttpTransport, Transport};
