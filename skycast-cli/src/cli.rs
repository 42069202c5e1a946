use anyhow::bail;
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use skycast_core::{Config, CurrentWeather, Forecast, GatewayClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather gateway CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city or a coordinate pair.
    Current {
        /// City name, e.g. "New York".
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },

    /// Show the upcoming forecast for a city.
    Forecast {
        /// City name, e.g. "New York".
        city: String,
    },

    /// Set the gateway base URL used for requests.
    Configure {
        /// Gateway base URL; prompts interactively when omitted.
        #[arg(long)]
        url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Current { city, lat, lon } => {
                let client = GatewayClient::new(Config::resolve()?);
                let weather = match (city, lat, lon) {
                    (Some(city), None, None) => client.fetch_weather_by_city(&city).await?,
                    (None, Some(lat), Some(lon)) => {
                        client.fetch_weather_by_coords(lat, lon).await?
                    }
                    _ => bail!(
                        "Provide a city name or both --lat and --lon.\n\
                         Hint: `skycast current Kyiv` or `skycast current --lat 50.45 --lon 30.52`."
                    ),
                };
                println!("{}", format_current(&weather));
            }

            Command::Forecast { city } => {
                let client = GatewayClient::new(Config::resolve()?);
                let forecast = client.fetch_forecast(&city).await?;
                println!("{}", format_forecast(&forecast));
            }

            Command::Configure { url } => configure(url)?,
        }

        Ok(())
    }
}

/// Persist a gateway base URL, prompting when none was passed.
fn configure(url: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let url = match url {
        Some(url) => url,
        None => inquire::Text::new("Gateway base URL:")
            .with_initial_value(&config.base_url)
            .with_help_message("Requests go to <base>/weather and <base>/forecast")
            .prompt()?,
    };

    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!(
            "Gateway base URL must start with http:// or https:// (got '{url}').\n\
             Hint: the default gateway is {}.",
            skycast_core::DEFAULT_BASE_URL
        );
    }

    config.base_url = url.trim_end_matches('/').to_string();
    config.save()?;

    println!("Saved gateway base URL: {}", config.base_url);
    println!("Config file: {}", Config::config_file_path()?.display());

    Ok(())
}

/// Shift a UTC instant into the location's fixed offset, when both exist.
fn in_zone(utc: Option<DateTime<Utc>>, offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let tz = FixedOffset::east_opt(offset_secs)?;
    Some(utc?.with_timezone(&tz))
}

fn format_current(weather: &CurrentWeather) -> String {
    let header = match weather.sys.as_ref().and_then(|s| s.country.as_deref()) {
        Some(country) => format!("{}, {}", weather.name, country),
        None => weather.name.clone(),
    };

    let mut lines = vec![
        header,
        format!(
            "  {}, {:.1}°C (feels like {:.1}°C)",
            weather.description().unwrap_or("unknown conditions"),
            weather.main.temp,
            weather.main.feels_like
        ),
        format!(
            "  humidity {}%, wind {:.1} m/s",
            weather.main.humidity, weather.wind.speed
        ),
    ];

    if let Some(observed) = in_zone(weather.observed_at(), weather.timezone) {
        lines.push(format!("  observed {}", observed.format("%Y-%m-%d %H:%M %:z")));
    }

    lines.join("\n")
}

fn format_forecast(forecast: &Forecast) -> String {
    let mut lines = vec![format!(
        "Forecast for {}, {}",
        forecast.city.name, forecast.city.country
    )];

    for entry in &forecast.list {
        let when = in_zone(entry.at(), forecast.city.timezone)
            .map(|t| t.format("%a %Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "(unknown time)".to_string());

        lines.push(format!(
            "  {}  {:>6.1}°C  {}",
            when,
            entry.main.temp,
            entry.description().unwrap_or("unknown conditions")
        ));
    }

    lines.join("\n")
}
