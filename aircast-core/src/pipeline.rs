//! Geocode, then fetch: one search, one result.
//!
//! Stages run strictly in sequence and the first failure ends the search.
//! [`SearchState`] is the value a front-end renders; each transition
//! replaces it wholesale.

use tracing::info;

use crate::{
    error::PipelineError,
    model::{AirQualityReading, ForecastEntry, LocationQuery, TimeRange, WeatherSnapshot},
    provider::{DataFetcher, Geocoder},
};

#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    geocoder: &'a dyn Geocoder,
    fetcher: &'a dyn DataFetcher,
}

impl<'a> Pipeline<'a> {
    pub fn new(geocoder: &'a dyn Geocoder, fetcher: &'a dyn DataFetcher) -> Self {
        Self { geocoder, fetcher }
    }

    pub async fn current_weather(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherSnapshot, PipelineError> {
        let at = self.geocoder.resolve(query).await?;
        self.fetcher.current_weather(at).await
    }

    pub async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastEntry>, PipelineError> {
        let at = self.geocoder.resolve(query).await?;
        self.fetcher.forecast(at).await
    }

    pub async fn air_quality(
        &self,
        query: &LocationQuery,
        range: Option<TimeRange>,
    ) -> Result<Vec<AirQualityReading>, PipelineError> {
        let at = self.geocoder.resolve(query).await?;
        self.fetcher.air_quality(at, range).await
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState<T> {
    #[default]
    Idle,
    Loading {
        query: LocationQuery,
    },
    Success {
        query: LocationQuery,
        data: T,
    },
    Failed {
        query: LocationQuery,
        message: String,
    },
}

impl<T> SearchState<T> {
    /// Start a search. Whatever was shown before is discarded.
    pub fn begin(self, query: LocationQuery) -> Self {
        SearchState::Loading { query }
    }

    /// Settle the search with its result. Outside `Loading` there is no
    /// query to attach, so the state is returned as is.
    pub fn finish(self, result: Result<T, PipelineError>) -> Self {
        match (self, result) {
            (SearchState::Loading { query }, Ok(data)) => SearchState::Success { query, data },
            (SearchState::Loading { query }, Err(err)) => {
                info!(%query, error = %err, "search failed");
                SearchState::Failed { query, message: err.user_message() }
            }
            (other, _) => other,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SearchState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
