use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::RestructError;

/// Weather for one location and time, as emitted by the external provider.
///
/// Field names on the wire follow the provider (`dt`, `timezone`, `weather`,
/// snake_case inside `main`); unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeatherReading {
    pub name: String,
    /// Seconds since the Unix epoch.
    #[serde(rename = "dt")]
    pub observed_at: i64,
    /// Meters.
    pub visibility: u32,
    /// Shift from UTC of the reading's location.
    #[serde(rename = "timezone")]
    pub timezone_offset_seconds: i32,
    pub main: MainReadings,
    pub sys: SunTimes,
    /// May be empty.
    #[serde(rename = "weather")]
    pub weather_conditions: Vec<WeatherCondition>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub feels_like: f64,
    /// Percent.
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Short condition summary, e.g. "Clouds".
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

impl RawWeatherReading {
    /// Summary of the first reported condition, if there is one.
    pub fn primary_condition(&self) -> Option<&str> {
        self.weather_conditions.first().map(|w| w.main.as_str())
    }

    pub fn offset(&self) -> Result<FixedOffset, RestructError> {
        FixedOffset::east_opt(self.timezone_offset_seconds)
            .ok_or(RestructError::InvalidTimezoneOffset(self.timezone_offset_seconds))
    }
}

/// Flattened reading handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeatherReading {
    pub name: String,
    pub temp: f64,
    pub min: f64,
    pub max: f64,
    pub main: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub sun_rise: String,
    pub sun_set: String,
    pub wind: f64,
    pub pressure: u32,
    pub humidity: u8,
    pub feel_like: f64,
    pub visibility: u32,
}
