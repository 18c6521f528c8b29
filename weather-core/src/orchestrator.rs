//! Application state and the sequencing of provider calls.
//!
//! The [`Orchestrator`] owns the [`ViewState`] the presentation layer reads.
//! Every mutation happens synchronously inside a `watch` update, so readers
//! never observe a snapshot paired with another fetch's forecast.
//!
//! Each primary search takes a ticket from a monotonically increasing counter.
//! Only the response holding the newest ticket is applied; a superseded
//! search still returns its own outcome to its caller but leaves state and
//! history alone.

use futures::future::join_all;
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    Config,
    error::{LocationError, Result, WeatherError},
    geolocation::{GeolocationResolver, LocationConsent},
    history::SearchHistory,
    model::{
        CitySuggestion, Coordinates, GlobalHighlight, Query, WeatherReport, daily_forecast,
    },
    provider::{SUGGESTION_LIMIT, WeatherProvider},
    storage::Storage,
    view::{Recommendation, Theme, TimeOfDay},
};

/// Suggestions are only looked up from this many characters on.
pub const MIN_SUGGESTION_CHARS: usize = 3;

/// How often the clock task re-derives time of day.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(60);

/// Condition used for ambient styling before anything has been fetched.
const FALLBACK_CONDITION: &str = "Clear";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    /// Last successful result. Kept when a later search fails.
    pub report: Option<WeatherReport>,
    /// Place name the provider resolved for the last successful search.
    pub place: Option<String>,
    pub error: Option<WeatherError>,
    pub suggestions: Vec<CitySuggestion>,
    pub history: Vec<String>,
    pub highlights: Vec<GlobalHighlight>,
    pub time_of_day: TimeOfDay,
}

impl ViewState {
    pub fn condition(&self) -> &str {
        self.report
            .as_ref()
            .map_or(FALLBACK_CONDITION, |r| r.snapshot.condition.as_str())
    }

    pub fn theme(&self) -> Theme {
        Theme::select(self.condition(), self.time_of_day)
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.report.as_ref().map(|r| {
            let s = &r.snapshot;
            Recommendation::select(s.temperature_c, &s.condition, s.wind.speed_mps)
        })
    }
}

pub struct Orchestrator {
    config: Config,
    provider: Arc<dyn WeatherProvider>,
    history: Mutex<SearchHistory>,
    consent: LocationConsent,
    state: watch::Sender<ViewState>,
    search_ticket: AtomicU64,
    suggest_ticket: AtomicU64,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        config: Config,
        provider: Arc<dyn WeatherProvider>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let history = SearchHistory::load(storage.clone());
        let initial = ViewState {
            history: history.entries().to_vec(),
            time_of_day: TimeOfDay::now(),
            ..ViewState::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            config,
            provider,
            history: Mutex::new(history),
            consent: LocationConsent::new(storage),
            state,
            search_ticket: AtomicU64::new(0),
            suggest_ticket: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Change notifications for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn needs_location_prompt(&self) -> bool {
        !self.consent.is_decided()
    }

    /// The user refused location access the last time they were asked.
    pub fn location_denied(&self) -> bool {
        self.consent.is_denied()
    }

    pub async fn search_by_name(&self, city: &str) -> Result<()> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }
        self.search(Query::City(city.to_owned())).await
    }

    pub async fn search_by_coordinates(&self, latitude: f64, longitude: f64) -> Result<()> {
        self.search(Query::Coordinates(Coordinates { latitude, longitude })).await
    }

    /// Resolve the device location and search there. The consent answer is
    /// recorded whatever the outcome: refused on `Denied`, allowed otherwise.
    pub async fn locate(&self, resolver: &dyn GeolocationResolver) -> Result<()> {
        let outcome = resolver.resolve().await;
        self.consent.record(matches!(outcome, Err(LocationError::Denied)));

        match outcome {
            Ok(c) => self.search_by_coordinates(c.latitude, c.longitude).await,
            Err(e) => {
                tracing::info!("location unavailable: {e:?}");
                let err = WeatherError::from(e);
                let ticket = self.begin_search();
                self.apply_failure(ticket, &err);
                Err(err)
            }
        }
    }

    /// Best-effort city lookup. Never surfaces an error.
    pub async fn request_suggestions(&self, partial: &str) {
        let ticket = self.suggest_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let found = if partial.chars().count() < MIN_SUGGESTION_CHARS {
            Vec::new()
        } else {
            match self.provider.suggest(partial, SUGGESTION_LIMIT).await {
                Ok(mut list) => {
                    list.truncate(SUGGESTION_LIMIT);
                    list
                }
                Err(e) => {
                    tracing::warn!(partial, "suggestion lookup failed: {e}");
                    Vec::new()
                }
            }
        };

        self.state.send_if_modified(|s| {
            if self.suggest_ticket.load(Ordering::SeqCst) != ticket {
                return false;
            }
            s.suggestions = found;
            true
        });
    }

    pub async fn select_suggestion(&self, suggestion: &CitySuggestion) -> Result<()> {
        self.clear_suggestions();
        self.search_by_name(&suggestion.label()).await
    }

    pub fn clear_suggestions(&self) {
        self.suggest_ticket.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|s| {
            let changed = !s.suggestions.is_empty();
            s.suggestions.clear();
            changed
        });
    }

    /// One lookup per reference city, concurrently. Failed cities are
    /// omitted; the call itself cannot fail.
    pub async fn load_global_highlights(&self) -> Vec<GlobalHighlight> {
        let lookups = self.config.reference_cities.iter().map(|city| async move {
            match self.provider.current(&Query::City(city.clone())).await {
                Ok(s) => Some(GlobalHighlight {
                    city: s.place,
                    temperature_c: s.temperature_c.round(),
                    icon: s.icon,
                    description: s.description,
                }),
                Err(e) => {
                    tracing::warn!(city = %city, "highlight lookup failed: {e}");
                    None
                }
            }
        });

        let highlights: Vec<GlobalHighlight> =
            join_all(lookups).await.into_iter().flatten().collect();

        let published = highlights.clone();
        self.state.send_modify(|s| s.highlights = published);
        highlights
    }

    /// State is left untouched if the stored list could not be removed.
    pub fn clear_history(&self) -> anyhow::Result<()> {
        let entries = {
            let mut history = self.history.lock();
            history.clear()?;
            history.entries().to_vec()
        };
        self.state.send_modify(|s| s.history = entries);
        Ok(())
    }

    pub fn set_time_of_day(&self, time: TimeOfDay) {
        self.state.send_if_modified(|s| {
            let changed = s.time_of_day != time;
            s.time_of_day = time;
            changed
        });
    }

    /// Refresh time of day from the local clock every [`CLOCK_PERIOD`]
    /// until `token` is cancelled.
    pub fn spawn_clock(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        self.spawn_clock_with(token, TimeOfDay::now)
    }

    /// Like [`Orchestrator::spawn_clock`], reading time of day from `clock`.
    /// The first tick fires immediately.
    pub fn spawn_clock_with<F>(
        self: &Arc<Self>,
        token: CancellationToken,
        clock: F,
    ) -> JoinHandle<()>
    where
        F: Fn() -> TimeOfDay + Send + 'static,
    {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLOCK_PERIOD);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => this.set_time_of_day(clock()),
                }
            }
        })
    }

    async fn search(&self, query: Query) -> Result<()> {
        let ticket = self.begin_search();

        let result = match self.config.api_key() {
            Ok(_) => self.fetch_report(&query).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => {
                self.apply_report(ticket, &query, report);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%query, "search failed: {err}");
                self.apply_failure(ticket, &err);
                Err(err)
            }
        }
    }

    /// Both calls run together; either failing fails the pair.
    async fn fetch_report(&self, query: &Query) -> Result<WeatherReport> {
        let (snapshot, samples) =
            tokio::try_join!(self.provider.current(query), self.provider.forecast(query))?;

        Ok(WeatherReport { snapshot, forecast: daily_forecast(samples) })
    }

    fn begin_search(&self) -> u64 {
        let ticket = self.search_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        let current = self.search_ticket.load(Ordering::SeqCst) == ticket;
        if !current {
            tracing::debug!(ticket, "dropping stale search response");
        }
        current
    }

    fn apply_report(&self, ticket: u64, query: &Query, report: WeatherReport) {
        self.state.send_if_modified(|s| {
            if !self.is_current(ticket) {
                return false;
            }

            let place = report.snapshot.place.clone();
            // Coordinate searches are remembered by the place the provider resolved.
            let entry = match query {
                Query::City(name) => name.as_str(),
                Query::Coordinates(_) => place.as_str(),
            };
            let history = {
                let mut history = self.history.lock();
                history.record(entry);
                history.entries().to_vec()
            };

            tracing::info!(place = %place, "weather updated");
            s.phase = Phase::Ready;
            s.error = None;
            s.report = Some(report);
            s.place = Some(place);
            s.history = history;
            true
        });
    }

    fn apply_failure(&self, ticket: u64, err: &WeatherError) {
        self.state.send_if_modified(|s| {
            if !self.is_current(ticket) {
                return false;
            }
            s.phase = Phase::Failed;
            s.error = Some(err.clone());
            true
        });
    }
}
