use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider samples are 3 hours apart, so every 8th one is a day later.
pub const FORECAST_STRIDE: usize = 8;
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// How a weather lookup is keyed.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates(Coordinates),
}

impl Query {
    /// Query parameters identifying the place, without credentials or units.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Query::City(name) => vec![("q", name.clone())],
            Query::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::City(name) => f.write_str(name),
            Query::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mps: f64,
    pub direction_deg: f64,
}

/// Current conditions for one place. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind: Wind,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// Short condition group, e.g. "Clear" or "Rain".
    pub condition: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

impl ForecastEntry {
    /// Short weekday name, e.g. "Mon".
    pub fn weekday(&self) -> String {
        self.time.format("%a").to_string()
    }
}

/// A snapshot and the forecast fetched alongside it. Always swapped as a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CitySuggestion {
    /// Canonical "name, country" form used as a search query.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalHighlight {
    pub city: String,
    /// Rounded to whole degrees.
    pub temperature_c: f64,
    pub icon: String,
    pub description: String,
}

/// One sample per day: indexes 0, 8, 16, ... truncated to five entries.
pub fn daily_forecast(samples: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    samples
        .into_iter()
        .step_by(FORECAST_STRIDE)
        .take(FORECAST_DAYS)
        .collect()
}

/// Provider icon CDN path for an icon identifier.
pub fn icon_url(base: &str, icon: &str, large: bool) -> String {
    let base = base.trim_end_matches('/');
    if large {
        format!("{base}/{icon}@2x.png")
    } else {
        format!("{base}/{icon}.png")
    }
}
