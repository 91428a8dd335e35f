use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use cityweather_core::{
    Action, App, City, Config, Country, LocationDirectory, Series, provider_from_config,
};
use inquire::{Password, PasswordDisplayMode};

use crate::{browse, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cityweather",
    version,
    about = "Current weather and 7-day forecasts by country and city"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// List the countries of the bundled directory.
    Countries,

    /// List the cities of a country.
    Cities {
        /// ISO code or name, e.g. "JP" or "Japan".
        country: String,
    },

    /// Look up one city and print the result.
    Show {
        /// ISO code or name of the country.
        #[arg(long)]
        country: String,

        /// City name within that country.
        #[arg(long)]
        city: String,

        /// Print a forecast series instead of current conditions.
        #[arg(long, value_enum)]
        series: Option<SeriesArg>,

        /// Print the whole report as JSON.
        #[arg(long, conflicts_with = "series")]
        json: bool,
    },

    /// Pick a country and city interactively and page through forecasts.
    Browse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeriesArg {
    Past,
    Future,
}

impl From<SeriesArg> for Series {
    fn from(value: SeriesArg) -> Self {
        match value {
            SeriesArg::Past => Series::Past,
            SeriesArg::Future => Series::Future,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if let Command::Configure = self.command {
            return configure();
        }

        let cfg = Config::load()?;
        match cfg.location_dataset() {
            Some(path) => {
                let directory = LocationDirectory::load_from(path)?;
                self.command.run(&cfg, &directory).await
            }
            None => {
                let directory =
                    LocationDirectory::bundled().context("Failed to load location directory")?;
                self.command.run(&cfg, directory).await
            }
        }
    }
}

impl Command {
    async fn run(self, cfg: &Config, directory: &LocationDirectory) -> anyhow::Result<()> {
        match self {
            Command::Configure => configure()?,
            Command::Countries => {
                for country in directory.list_countries() {
                    println!("{}", render::country_line(country));
                }
            }
            Command::Cities { country } => {
                let country = resolve_country(directory, &country)?;
                for city in directory.list_cities(&country.code) {
                    println!("{}", render::city_line(&city));
                }
            }
            Command::Show {
                country,
                city,
                series,
                json,
            } => {
                let (country, city) = resolve_location(directory, &country, &city)?;
                tracing::debug!(country = %country.code, city = %city.name, "one-shot lookup");
                let provider = provider_from_config(cfg)?;
                let mut app = App::new(directory, provider);

                app.dispatch(Action::SelectCountry(Some(country.code))).await;
                app.dispatch(Action::SelectCity(Some(city.name))).await;
                let state = app.dispatch(Action::Submit).await;

                if let Some(error) = state.error() {
                    bail!("{error}");
                }
                let Some(report) = state.report() else {
                    bail!("No weather data available");
                };

                if json {
                    println!("{}", serde_json::to_string_pretty(report)?);
                } else if let Some(series) = series {
                    let series = Series::from(series);
                    let days = match series {
                        Series::Past => &report.past,
                        Series::Future => &report.future,
                    };
                    println!("{}", render::series_listing(series, days));
                } else {
                    println!("{}", render::summary(report, Utc::now()));
                }
            }
            Command::Browse => {
                let provider = provider_from_config(cfg)?;
                browse::run(App::new(directory, provider)).await?;
            }
        }

        Ok(())
    }
}

/// Prompt for the API key and write it to the config file.
///
/// Only the file's own contents are loaded and saved; environment overrides
/// never reach disk.
fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    cfg.set_api_key(api_key);
    cfg.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn resolve_country<'a>(directory: &'a LocationDirectory, query: &str) -> anyhow::Result<&'a Country> {
    directory.find_country(query).with_context(|| {
        format!("Unknown country '{query}'. Run `cityweather countries` to list them.")
    })
}

fn resolve_location(
    directory: &LocationDirectory,
    country: &str,
    city: &str,
) -> anyhow::Result<(Country, City)> {
    let country = resolve_country(directory, country)?;
    let city = directory.find_city(&country.code, city).with_context(|| {
        format!(
            "Unknown city '{city}' in {}. Run `cityweather cities {}` to list them.",
            country.name, country.code
        )
    })?;

    Ok((country.clone(), city))
}
