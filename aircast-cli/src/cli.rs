use std::process::ExitCode;

use aircast_core::{
    Config, LocationQuery, OpenWeatherClient, Pipeline, SearchState, TimeRange, client_from_config,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aircast", version, about = "Weather, forecasts and air quality by city")]
pub struct Cli {
    /// Log requests and pipeline stages to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// City plus optional country code, as typed by the user.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name, e.g. "Recife".
    pub city: String,

    /// ISO-3166 alpha-2 country code, e.g. "BR".
    #[arg(short, long)]
    pub country: Option<String>,
}

impl LocationArgs {
    fn query(&self) -> LocationQuery {
        LocationQuery::new(self.city.clone(), self.country.clone())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Alternative API host, e.g. a local mock server.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show current weather.
    Current(LocationArgs),

    /// Show the 5-day / 3-hour forecast.
    Forecast(LocationArgs),

    /// Show current air quality with per-pollutant levels.
    Air(LocationArgs),

    /// Show air-quality history between two dates.
    History {
        #[command(flatten)]
        location: LocationArgs,

        /// Start of window, YYYY-MM-DD (UTC midnight of this date).
        #[arg(long)]
        start: String,

        /// End of window, YYYY-MM-DD (UTC midnight of this date, so the day itself is excluded).
        #[arg(long)]
        end: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let ok = match self.command {
            Command::Configure { base_url } => {
                configure(base_url)?;
                true
            }
            Command::Current(location) => {
                let client = open_client()?;
                let pipeline = Pipeline::new(&client, &client);
                let query = location.query();
                let state = SearchState::Idle.begin(query.clone());
                report(state.finish(pipeline.current_weather(&query).await), render::current)
            }
            Command::Forecast(location) => {
                let client = open_client()?;
                let pipeline = Pipeline::new(&client, &client);
                let query = location.query();
                let state = SearchState::Idle.begin(query.clone());
                report(state.finish(pipeline.forecast(&query).await), |q, entries| {
                    render::forecast(q, entries)
                })
            }
            Command::Air(location) => {
                let client = open_client()?;
                let pipeline = Pipeline::new(&client, &client);
                let query = location.query();
                let state = SearchState::Idle.begin(query.clone());
                report(state.finish(pipeline.air_quality(&query, None).await), |q, readings| {
                    render::air_quality(q, readings)
                })
            }
            Command::History { location, start, end } => {
                let client = open_client()?;
                let pipeline = Pipeline::new(&client, &client);
                let query = location.query();
                let state = SearchState::Idle.begin(query.clone());
                let result = match TimeRange::from_dates(&start, &end) {
                    Ok(range) => pipeline.air_quality(&query, Some(range)).await,
                    Err(err) => Err(err),
                };
                report(state.finish(result), |q, readings| render::history(q, readings))
            }
        };

        Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

fn open_client() -> anyhow::Result<OpenWeatherClient> {
    let config = Config::load()?;
    debug!(base_url = config.base_url(), "using OpenWeather endpoint");
    client_from_config(&config)
}

/// Prints a settled search. Returns whether it succeeded.
fn report<T>(state: SearchState<T>, render: impl FnOnce(&LocationQuery, &T) -> String) -> bool {
    match &state {
        SearchState::Success { query, data } => {
            println!("{}", render(query, data));
            true
        }
        SearchState::Failed { message, .. } => {
            eprintln!("{message}");
            false
        }
        SearchState::Idle | SearchState::Loading { .. } => false,
    }
}

fn configure(base_url: Option<String>) -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    config.base_url = match base_url {
        Some(url) => Some(url),
        None if config.base_url.is_some() => {
            let current = config.base_url().to_string();
            let url = Text::new("API base URL:")
                .with_default(&current)
                .prompt()
                .context("Failed to read base URL")?;
            Some(url)
        }
        None => None,
    };

    config.save_to(&path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
