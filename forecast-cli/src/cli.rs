use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, FetchOptions, ForecastClient, ForecastRequest, ForecastTime, Units,
    config::DEFAULT_API_HOST, render,
};
use inquire::{Password, Text};
use log::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key (and optionally a custom API host).
    Configure,

    /// Show the forecast for a location.
    #[command(allow_negative_numbers = true)]
    Show {
        /// Latitude in decimal degrees.
        #[arg(allow_hyphen_values = true)]
        latitude: String,

        /// Longitude in decimal degrees.
        #[arg(allow_hyphen_values = true)]
        longitude: String,

        /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[Z|±HHMM]`; if absent, means "now".
        #[arg(long)]
        time: Option<String>,

        /// us, si, ca, uk or auto.
        #[arg(long, default_value = "us")]
        units: String,

        #[arg(long, default_value = "en")]
        lang: String,

        /// Comma-separated blocks to leave out, e.g. "minutely,alerts".
        #[arg(long)]
        exclude: Option<String>,

        /// Return 168 hours of hourly data instead of 48.
        #[arg(long)]
        extend_hourly: bool,

        /// Attach the raw response JSON.
        #[arg(long)]
        json: bool,

        /// Attach cache and usage response headers.
        #[arg(long)]
        headers: bool,

        /// Print the result as JSON instead of tables.
        #[arg(long)]
        raw: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                latitude,
                longitude,
                time,
                units,
                lang,
                exclude,
                extend_hourly,
                json,
                headers,
                raw,
            } => {
                let mut request = ForecastRequest::new(latitude, longitude)
                    .units(units.parse::<Units>()?)
                    .language(lang)
                    .extend_hourly(extend_hourly);
                if let Some(time) = time {
                    request = request.at(parse_time(&time));
                }
                if let Some(exclude) = exclude {
                    request = request.exclude(exclude);
                }

                let config = Config::load()?;
                let client = ForecastClient::new(config)?;
                let options = FetchOptions {
                    add_json: json,
                    add_headers: headers,
                };
                let result = client.get_forecast_for(&request, options).await?;

                if raw {
                    let text = serde_json::to_string_pretty(&result)
                        .context("Failed to serialize forecast result")?;
                    println!("{text}");
                } else {
                    print!("{}", render(&result));
                }
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let host = Text::new("API host:")
        .with_default(config.api_host.as_deref().unwrap_or(DEFAULT_API_HOST))
        .prompt()
        .context("Failed to read API host")?;
    config.api_host = (host != DEFAULT_API_HOST).then_some(host);

    config.save()?;
    debug!("config written to {}", Config::config_file_path()?.display());
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

/// A bare date becomes midnight; anything else is sent as typed.
fn parse_time(input: &str) -> ForecastTime {
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => ForecastTime::Date(date),
        Err(_) => ForecastTime::from(input),
    }
}
