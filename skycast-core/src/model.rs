use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions as returned by the gateway's `/weather` endpoint.
///
/// The gateway proxies OpenWeatherMap, so field names follow that schema.
/// Unknown fields are ignored and nothing is transformed at decode time;
/// the accessors below are plain conveniences over the wire values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Resolved location name, e.g. "New York".
    pub name: String,
    /// Observation time as a unix timestamp (UTC seconds).
    pub dt: i64,
    /// Shift from UTC of the location's timezone, in seconds.
    pub timezone: i32,
    pub main: Main,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    #[serde(default)]
    pub sys: Option<Sys>,
}

impl CurrentWeather {
    /// Observation time as UTC, when the gateway supplied a valid epoch.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// First condition line, e.g. "light rain".
    pub fn description(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }
}

/// Temperature and atmosphere readings (`main` block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Atmospheric pressure in hPa.
    pub pressure: u32,
    /// Relative humidity in percent.
    pub humidity: u8,
}

/// One entry of the `weather` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Condition group, e.g. "Rain".
    pub main: String,
    /// Human-readable detail, e.g. "light rain".
    pub description: String,
    /// Icon code understood by OpenWeatherMap's icon CDN, e.g. "10d".
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed in m/s (the gateway requests metric units).
    pub speed: f64,
    /// Direction in meteorological degrees; absent on calm readings.
    #[serde(default)]
    pub deg: Option<f64>,
}

/// Country and sun times (`sys` block); sparse for open-water coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Forecast as returned by the gateway's `/forecast` endpoint
/// (OpenWeatherMap's 5-day format: one entry per 3-hour period).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub city: City,
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    /// Shift from UTC of the city's timezone, in seconds.
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Start of the forecast period as a unix timestamp (UTC seconds).
    pub dt: i64,
    pub main: Main,
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

impl ForecastEntry {
    /// Start of the forecast period as UTC, when the epoch is valid.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// First condition line, e.g. "scattered clouds".
    pub fn description(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }
}
