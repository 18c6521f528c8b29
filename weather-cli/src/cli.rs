use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Select};
use std::sync::Arc;
use weather_explorer_core::{
    CitySuggestion, Config, ConfiguredLocation, FileStorage, LocationError, Orchestrator,
    StaticResolver, ViewState, model::icon_url, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-explorer", version, about = "Explore the world's weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Show current weather and a 5-day forecast for a city.
    Show {
        /// City name, optionally followed by a country code ("Paris, FR").
        city: String,
    },

    /// Show weather for the configured device location.
    Here {
        /// Allow location access, overriding an earlier refusal.
        #[arg(long)]
        allow: bool,
    },

    /// Look up cities matching a partial name and pick one.
    Suggest {
        /// At least three characters of a city name.
        partial: String,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Current conditions in a few reference cities.
    Highlights,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            command => execute(&build_orchestrator()?, command).await,
        }
    }
}

async fn execute(orch: &Orchestrator, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Configure => configure()?,
        Command::Show { city } => {
            let result = orch.search_by_name(&city).await;
            render(orch, result)?;
        }
        Command::Here { allow } => {
            let refused = if allow {
                false
            } else if orch.needs_location_prompt() {
                !ask_location_consent()?
            } else {
                orch.location_denied()
            };

            let result = if refused {
                orch.locate(&StaticResolver(Err(LocationError::Denied))).await
            } else {
                let resolver = ConfiguredLocation::new(orch.config().location);
                orch.locate(&resolver).await
            };
            render(orch, result)?;
        }
        Command::Suggest { partial } => suggest(orch, &partial).await?,
        Command::History { clear } => {
            if clear {
                orch.clear_history()?;
                println!("Search history cleared.");
            } else {
                print_history(&orch.state());
            }
        }
        Command::Highlights => {
            let highlights = orch.load_global_highlights().await;
            if highlights.is_empty() {
                println!("No highlights available right now.");
            }
            for h in highlights {
                println!(
                    "{:<16} {:>4.0}°C  {}  {}",
                    h.city,
                    h.temperature_c,
                    h.description,
                    icon_url(&orch.config().icon_base_url, &h.icon, false)
                );
            }
        }
    }

    Ok(())
}

fn build_orchestrator() -> anyhow::Result<Orchestrator> {
    let config = Config::load()?;
    let storage = FileStorage::in_dir(&Config::data_dir()?);
    let provider = provider_from_config(&config)?;

    Ok(Orchestrator::new(config, provider, Arc::new(storage)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt was cancelled")?;

    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn ask_location_consent() -> anyhow::Result<bool> {
    Confirm::new("Allow weather-explorer to use your configured location?")
        .with_default(true)
        .prompt()
        .context("location prompt was cancelled")
}

async fn suggest(orch: &Orchestrator, partial: &str) -> anyhow::Result<()> {
    orch.request_suggestions(partial).await;
    let suggestions = orch.state().suggestions;

    if suggestions.is_empty() {
        println!("No matching cities.");
        return Ok(());
    }

    let labels: Vec<String> = suggestions.iter().map(describe_suggestion).collect();
    let picked = Select::new("Pick a city:", labels)
        .raw_prompt()
        .context("city selection was cancelled")?;

    let result = orch.select_suggestion(&suggestions[picked.index]).await;
    render(orch, result)
}

fn describe_suggestion(s: &CitySuggestion) -> String {
    match &s.state {
        Some(state) => format!("{}, {}, {}", s.name, state, s.country),
        None => s.label(),
    }
}

/// Print the view state after a search; a failed search still shows the
/// last good report before returning the error.
fn render(
    orch: &Orchestrator,
    result: Result<(), weather_explorer_core::WeatherError>,
) -> anyhow::Result<()> {
    let state = orch.state();
    print_report(&state, &orch.config().icon_base_url);
    result.map_err(anyhow::Error::from)
}

fn print_report(state: &ViewState, icon_base: &str) {
    let Some(report) = &state.report else {
        return;
    };
    let s = &report.snapshot;

    println!("{}, {}", s.place, s.country);
    println!(
        "  {:.1}°C (feels like {:.1}°C), {}",
        s.temperature_c, s.feels_like_c, s.description
    );
    println!("  Humidity {}%  Pressure {:.0} hPa", s.humidity_pct, s.pressure_hpa);
    println!("  Wind {:.1} m/s from {:.0}°", s.wind.speed_mps, s.wind.direction_deg);
    println!(
        "  Sunrise {}  Sunset {}",
        s.sunrise.with_timezone(&Local).format("%H:%M"),
        s.sunset.with_timezone(&Local).format("%H:%M"),
    );
    println!("  Icon {}", icon_url(icon_base, &s.icon, true));

    if !report.forecast.is_empty() {
        println!();
        println!("Forecast:");
        for day in &report.forecast {
            println!("  {}  {:>5.1}°C  {}", day.weekday(), day.temperature_c, day.description);
        }
    }

    println!();
    if let Some(rec) = state.recommendation() {
        println!("Tip: {}", rec.text());
    }
    let (from, to) = state.theme().gradient();
    println!("Theme: {:?} ({from} → {to})", state.theme());
}

fn print_history(state: &ViewState) {
    if state.history.is_empty() {
        println!("No recent searches.");
        return;
    }
    for (i, city) in state.history.iter().enumerate() {
        println!("{}. {city}", i + 1);
    }
}
