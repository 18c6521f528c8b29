use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Config,
    error::{Result, WeatherError},
    model::{CitySuggestion, ForecastEntry, Query, WeatherSnapshot, Wind},
};

use super::WeatherProvider;

/// OpenWeatherMap client for current conditions, 5-day forecast and geocoding.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    api_base_url: String,
    geo_base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            api_key: config.api_key().ok().map(str::to_owned),
            api_base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            geo_base_url: config.geo_base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    fn credential(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(WeatherError::MissingCredential)
    }

    /// GET `url` with `params` plus credentials, returning the body of a 2xx response.
    async fn get(
        &self,
        url: &str,
        mut params: Vec<(&'static str, String)>,
        query: Option<&Query>,
    ) -> Result<String> {
        params.push(("appid", self.credential()?.to_owned()));
        tracing::debug!(url, "provider request");

        let res = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| WeatherError::provider(format!("request to {url} failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::provider(format!("failed to read response body: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }

        match (status, query) {
            (StatusCode::NOT_FOUND, Some(q)) => {
                Err(WeatherError::NotFound { query: q.to_string() })
            }
            _ => Err(WeatherError::Provider(error_message(status, &body))),
        }
    }
}

/// Current conditions: every field is required.
#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

/// Forecast samples only need a temperature.
#[derive(Debug, Deserialize)]
struct OwSampleMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwSampleMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self> {
        let weather = first_condition(raw.weather)?;

        Ok(WeatherSnapshot {
            place: raw.name,
            country: raw.sys.country,
            temperature_c: raw.main.temp,
            feels_like_c: raw.main.feels_like,
            humidity_pct: raw.main.humidity,
            pressure_hpa: raw.main.pressure,
            wind: Wind { speed_mps: raw.wind.speed, direction_deg: raw.wind.deg },
            sunrise: unix_to_utc(raw.sys.sunrise)?,
            sunset: unix_to_utc(raw.sys.sunset)?,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = WeatherError;

    fn try_from(raw: OwForecastEntry) -> Result<Self> {
        let weather = first_condition(raw.weather)?;

        Ok(ForecastEntry {
            time: unix_to_utc(raw.dt)?,
            temperature_c: raw.main.temp,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
        })
    }
}

impl From<OwGeoEntry> for CitySuggestion {
    fn from(raw: OwGeoEntry) -> Self {
        CitySuggestion {
            name: raw.name,
            country: raw.country,
            state: raw.state,
            latitude: raw.lat,
            longitude: raw.lon,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, query: &Query) -> Result<WeatherSnapshot> {
        let url = format!("{}/weather", self.api_base_url);
        let body = self.get(&url, metric(query), Some(query)).await?;

        let raw: OwCurrentResponse = parse(&body, "current weather")?;
        raw.try_into()
    }

    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>> {
        let url = format!("{}/forecast", self.api_base_url);
        let body = self.get(&url, metric(query), Some(query)).await?;

        let raw: OwForecastResponse = parse(&body, "forecast")?;
        raw.list.into_iter().map(ForecastEntry::try_from).collect()
    }

    async fn suggest(&self, partial: &str, limit: usize) -> Result<Vec<CitySuggestion>> {
        let url = format!("{}/direct", self.geo_base_url);
        let params = vec![("q", partial.to_owned()), ("limit", limit.to_string())];
        let body = self.get(&url, params, None).await?;

        let raw: Vec<OwGeoEntry> = parse(&body, "geocoding")?;
        Ok(raw.into_iter().take(limit).map(CitySuggestion::from).collect())
    }
}

fn metric(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = query.params();
    params.push(("units", "metric".to_owned()));
    params
}

fn parse<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| WeatherError::provider(format!("malformed {what} response: {e}")))
}

fn first_condition(weather: Vec<OwWeather>) -> Result<OwWeather> {
    weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::provider("malformed response: no weather conditions"))
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::provider(format!("malformed response: bad timestamp {ts}")))
}

/// Prefer the provider's own `message`; fall back to status and a truncated body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) => format!("provider returned status {status}: {}", truncate_body(body)),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
