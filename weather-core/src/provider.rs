use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::Result,
    model::{CitySuggestion, ForecastEntry, Query, WeatherSnapshot},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Upper bound on geocoding candidates requested from the provider.
pub const SUGGESTION_LIMIT: usize = 5;

/// Outbound calls the orchestrator makes. Implementations classify their own
/// failures into [`crate::WeatherError`] kinds.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a place.
    async fn current(&self, query: &Query) -> Result<WeatherSnapshot>;

    /// Raw forecast timeline at the provider's 3-hour granularity.
    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>>;

    /// Ranked city candidates for a partial name.
    async fn suggest(&self, partial: &str, limit: usize) -> Result<Vec<CitySuggestion>>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>> {
    Ok(Arc::new(OpenWeatherClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_builds_without_a_key() {
        // The key is checked per call, not at construction.
        let provider = provider_from_config(&Config::default());
        assert!(provider.is_ok());
    }
}
