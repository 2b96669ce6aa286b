//! Mapping from the provider's nested reading to the flattened shape.

use std::fmt::Write;

use chrono::{
    DateTime, FixedOffset, Offset, Utc,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::RestructError,
    model::{NormalizedWeatherReading, RawWeatherReading},
};

/// Which clock timestamps are rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    /// The reading's own `timezone` offset.
    #[default]
    Local,
    Utc,
}

impl Clock {
    pub fn as_str(&self) -> &'static str {
        match self {
            Clock::Local => "local",
            Clock::Utc => "utc",
        }
    }

    pub const fn all() -> &'static [Clock] {
        &[Clock::Local, Clock::Utc]
    }
}

impl std::fmt::Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// chrono strftime pattern used for `time`, `sunRise` and `sunSet`.
    pub time_format: String,
    pub clock: Clock,
    /// When false, `time` is left empty.
    pub include_time: bool,
    /// Used for `main` when the reading carries no conditions.
    pub unknown_condition: String,
}

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            clock: Clock::Local,
            include_time: true,
            unknown_condition: "Unknown".to_string(),
        }
    }
}

impl FormatOptions {
    pub fn validate(&self) -> Result<(), RestructError> {
        validate_time_format(&self.time_format)
    }
}

/// Reject patterns chrono would fail to render.
pub fn validate_time_format(format: &str) -> Result<(), RestructError> {
    if format.trim().is_empty()
        || StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
    {
        return Err(RestructError::InvalidTimeFormat(format.to_string()));
    }
    Ok(())
}

/// Flatten one raw reading.
pub fn restructure(
    raw: &RawWeatherReading,
    options: &FormatOptions,
) -> Result<NormalizedWeatherReading, RestructError> {
    options.validate()?;

    let offset = match options.clock {
        Clock::Local => raw.offset()?,
        Clock::Utc => Utc.fix(),
    };
    let render = |field: &'static str, ts: i64| format_timestamp(field, ts, offset, options);

    let main = match raw.primary_condition() {
        Some(condition) => condition.to_string(),
        None => {
            warn!(location = %raw.name, "reading has no weather conditions, using fallback");
            options.unknown_condition.clone()
        }
    };

    let time = if options.include_time {
        Some(render("dt", raw.observed_at)?)
    } else {
        None
    };

    let normalized = NormalizedWeatherReading {
        name: raw.name.clone(),
        temp: raw.main.temp,
        min: raw.main.temp_min,
        max: raw.main.temp_max,
        main,
        time,
        sun_rise: render("sys.sunrise", raw.sys.sunrise)?,
        sun_set: render("sys.sunset", raw.sys.sunset)?,
        wind: raw.wind.speed,
        pressure: raw.main.pressure,
        humidity: raw.main.humidity,
        feel_like: raw.main.feels_like,
        visibility: raw.visibility,
    };

    debug!(location = %normalized.name, clock = %options.clock, "restructured reading");
    Ok(normalized)
}

/// Flatten a batch, stopping at the first reading that fails.
pub fn restructure_all(
    raws: &[RawWeatherReading],
    options: &FormatOptions,
) -> Result<Vec<NormalizedWeatherReading>, RestructError> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            restructure(raw, options).map_err(|e| RestructError::Reading {
                index,
                name: raw.name.clone(),
                source: Box::new(e),
            })
        })
        .collect()
}

fn format_timestamp(
    field: &'static str,
    ts: i64,
    offset: FixedOffset,
    options: &FormatOptions,
) -> Result<String, RestructError> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or(RestructError::TimestampOutOfRange { field, value: ts })?;

    let mut out = String::new();
    write!(
        out,
        "{}",
        utc.with_timezone(&offset)
            .format_with_items(StrftimeItems::new(&options.time_format))
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::london;

    #[test]
    fn maps_the_london_example() {
        let normalized = restructure(&london(), &FormatOptions::default()).expect("maps");

        assert_eq!(normalized.name, "London");
        assert_eq!(normalized.main, "Clouds");
        assert_eq!(normalized.temp, 16.0);
        assert_eq!(normalized.min, 14.0);
        assert_eq!(normalized.max, 18.0);
        assert_eq!(normalized.feel_like, 15.2);
        assert_eq!(normalized.humidity, 60);
        assert_eq!(normalized.pressure, 1012);
        assert_eq!(normalized.wind, 3.5);
        assert_eq!(normalized.visibility, 10000);
        assert_eq!(normalized.sun_rise, "02:33");
        assert_eq!(normalized.sun_set, "13:40");
        assert_eq!(normalized.time.as_deref(), Some("05:20"));
    }

    #[test]
    fn local_clock_applies_the_reading_offset() {
        let mut raw = london();
        raw.timezone_offset_seconds = 3600;

        let local = restructure(&raw, &FormatOptions::default()).expect("maps");
        assert_eq!(local.sun_rise, "03:33");
        assert_eq!(local.sun_set, "14:40");
        assert_eq!(local.time.as_deref(), Some("06:20"));

        let utc_opts = FormatOptions { clock: Clock::Utc, ..FormatOptions::default() };
        let utc = restructure(&raw, &utc_opts).expect("maps");
        assert_eq!(utc.sun_rise, "02:33");
        assert_eq!(utc.time.as_deref(), Some("05:20"));
    }

    #[test]
    fn utc_clock_ignores_a_bad_offset() {
        let mut raw = london();
        raw.timezone_offset_seconds = 100_000;

        let err = restructure(&raw, &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, RestructError::InvalidTimezoneOffset(100_000)));

        let utc_opts = FormatOptions { clock: Clock::Utc, ..FormatOptions::default() };
        assert!(restructure(&raw, &utc_opts).is_ok());
    }

    #[test]
    fn time_can_be_left_out() {
        let opts = FormatOptions { include_time: false, ..FormatOptions::default() };
        let normalized = restructure(&london(), &opts).expect("maps");

        assert_eq!(normalized.time, None);
        assert_eq!(normalized.sun_rise, "02:33");
    }

    #[test]
    fn custom_format_is_used_for_all_timestamps() {
        let opts = FormatOptions {
            time_format: "%Y-%m-%d %H:%M:%S".to_string(),
            ..FormatOptions::default()
        };
        let normalized = restructure(&london(), &opts).expect("maps");

        assert_eq!(normalized.time.as_deref(), Some("2022-04-15 05:20:00"));
        assert_eq!(normalized.sun_rise, "2022-04-15 02:33:20");
        assert_eq!(normalized.sun_set, "2022-04-15 13:40:00");
    }

    #[test]
    fn empty_conditions_fall_back() {
        let mut raw = london();
        raw.weather_conditions.clear();

        let opts = FormatOptions { unknown_condition: "n/a".to_string(), ..FormatOptions::default() };
        let normalized = restructure(&raw, &opts).expect("maps");
        assert_eq!(normalized.main, "n/a");
    }

    #[test]
    fn first_condition_wins() {
        let mut raw = london();
        raw.weather_conditions.push(crate::model::WeatherCondition { main: "Rain".into() });

        let normalized = restructure(&raw, &FormatOptions::default()).expect("maps");
        assert_eq!(normalized.main, "Clouds");
    }

    #[test]
    fn invalid_format_is_rejected_before_rendering() {
        for bad in ["%Q", "", "   "] {
            let opts = FormatOptions { time_format: bad.to_string(), ..FormatOptions::default() };
            let err = restructure(&london(), &opts).unwrap_err();
            assert!(matches!(err, RestructError::InvalidTimeFormat(_)), "format {bad:?}");
        }
    }

    #[test]
    fn unrepresentable_timestamp_names_the_field() {
        let mut raw = london();
        raw.sys.sunset = i64::MAX;

        let err = restructure(&raw, &FormatOptions::default()).unwrap_err();
        match err {
            RestructError::TimestampOutOfRange { field, value } => {
                assert_eq!(field, "sys.sunset");
                assert_eq!(value, i64::MAX);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn batch_error_names_the_failing_reading() {
        let mut bad = london();
        bad.name = "Nowhere".into();
        bad.observed_at = i64::MIN;

        let err = restructure_all(&[london(), bad], &FormatOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("#1"), "{msg}");
        assert!(msg.contains("Nowhere"), "{msg}");
        assert!(matches!(err, RestructError::Reading { index: 1, .. }));
    }

    #[test]
    fn batch_preserves_order() {
        let mut paris = london();
        paris.name = "Paris".into();

        let out = restructure_all(&[london(), paris], &FormatOptions::default()).expect("maps");
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["London", "Paris"]);
    }
}
