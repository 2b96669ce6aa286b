//! Checks for properties a reading is expected to have but that its shape
//! does not enforce. Nothing here runs unless asked for.

use thiserror::Error;
use tracing::debug;

use crate::{error::RestructError, model::RawWeatherReading};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingIssue {
    #[error("temperature {temp} is outside its reported range {min}..{max}")]
    TemperatureOutOfRange { temp: f64, min: f64, max: f64 },

    #[error("humidity {0}% is above 100")]
    HumidityOutOfRange(u8),

    #[error("wind speed {0} is negative")]
    NegativeWindSpeed(f64),

    #[error("`{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("no weather conditions reported")]
    NoConditions,

    #[error("sunset ({sunset}) is before sunrise ({sunrise})")]
    SunsetBeforeSunrise { sunrise: i64, sunset: i64 },
}

/// Collect every issue with `raw`; empty when the reading looks sound.
pub fn check(raw: &RawWeatherReading) -> Vec<ReadingIssue> {
    let mut issues = Vec::new();
    let main = &raw.main;

    let numbers = [
        ("main.feels_like", main.feels_like),
        ("main.temp", main.temp),
        ("main.temp_min", main.temp_min),
        ("main.temp_max", main.temp_max),
        ("wind.speed", raw.wind.speed),
    ];
    for (field, value) in numbers {
        if !value.is_finite() {
            issues.push(ReadingIssue::NonFinite(field));
        }
    }

    // Range checks only apply to finite values; the rest are reported above.
    let temps_finite = [main.temp, main.temp_min, main.temp_max].iter().all(|t| t.is_finite());
    if temps_finite && (main.temp < main.temp_min || main.temp > main.temp_max) {
        issues.push(ReadingIssue::TemperatureOutOfRange {
            temp: main.temp,
            min: main.temp_min,
            max: main.temp_max,
        });
    }

    if main.humidity > 100 {
        issues.push(ReadingIssue::HumidityOutOfRange(main.humidity));
    }

    if raw.wind.speed.is_finite() && raw.wind.speed < 0.0 {
        issues.push(ReadingIssue::NegativeWindSpeed(raw.wind.speed));
    }

    if raw.weather_conditions.is_empty() {
        issues.push(ReadingIssue::NoConditions);
    }

    if raw.sys.sunset < raw.sys.sunrise {
        issues.push(ReadingIssue::SunsetBeforeSunrise {
            sunrise: raw.sys.sunrise,
            sunset: raw.sys.sunset,
        });
    }

    for issue in &issues {
        debug!(location = %raw.name, %issue, "suspicious reading");
    }

    issues
}

pub fn ensure_valid(raw: &RawWeatherReading) -> Result<(), RestructError> {
    let issues = check(raw);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(RestructError::Invalid { name: raw.name.clone(), issues })
    }
}
