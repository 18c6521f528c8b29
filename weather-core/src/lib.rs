//! Core library for the weather explorer.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client behind the `WeatherProvider` trait
//! - Search history and other persisted key-value state
//! - Geolocation resolution
//! - Derived view state (theme, time of day, lifestyle recommendation)
//! - The `Orchestrator`, which sequences fetches and owns application state
//!
//! It is used by `weather-explorer`, but can also back other front-ends.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod storage;
pub mod view;

pub use config::Config;
pub use error::{ErrorKind, LocationError, WeatherError};
pub use geolocation::{ConfiguredLocation, GeolocationResolver, LocationConsent, StaticResolver};
pub use history::SearchHistory;
pub use model::{
    CitySuggestion, Coordinates, ForecastEntry, GlobalHighlight, Query, WeatherReport,
    WeatherSnapshot, Wind,
};
pub use orchestrator::{Orchestrator, Phase, ViewState};
pub use provider::{OpenWeatherClient, WeatherProvider, provider_from_config};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use view::{Recommendation, Theme, TimeOfDay};
