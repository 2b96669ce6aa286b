use anyhow::{Context, Result};
use clap::ValueEnum;
use restruct_core::{NormalizedWeatherReading, ReadingIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON, one document.
    #[default]
    Json,
    /// Indented JSON.
    Pretty,
    /// Readable summary per reading.
    Text,
}

/// Render readings; a single-object input renders as a single object.
pub fn render_readings(
    readings: &[NormalizedWeatherReading],
    single: bool,
    format: OutputFormat,
) -> Result<String> {
    let out = match (format, single, readings) {
        (OutputFormat::Json, true, [one]) => serde_json::to_string(one),
        (OutputFormat::Pretty, true, [one]) => serde_json::to_string_pretty(one),
        (OutputFormat::Json, _, _) => serde_json::to_string(readings),
        (OutputFormat::Pretty, _, _) => serde_json::to_string_pretty(readings),
        (OutputFormat::Text, _, _) => {
            return Ok(readings.iter().map(render_text).collect::<Vec<_>>().join("\n\n"));
        }
    };

    out.context("Failed to serialize normalized readings")
}

pub fn render_text(r: &NormalizedWeatherReading) -> String {
    let mut lines = vec![
        format!(
            "{}: {}, {:.1}°C (feels like {:.1}°C, {:.1}..{:.1})",
            r.name, r.main, r.temp, r.feel_like, r.min, r.max
        ),
        format!(
            "  wind {:.1} m/s, pressure {} hPa, humidity {}%, visibility {} m",
            r.wind, r.pressure, r.humidity, r.visibility
        ),
        format!("  sunrise {}, sunset {}", r.sun_rise, r.sun_set),
    ];

    if let Some(time) = &r.time {
        lines.push(format!("  observed {time}"));
    }

    lines.join("\n")
}

pub fn render_issues(name: &str, issues: &[ReadingIssue]) -> String {
    if issues.is_empty() {
        return format!("{name}: ok");
    }

    let mut out = format!("{name}: {} issue(s)", issues.len());
    for issue in issues {
        out.push_str(&format!("\n  - {issue}"));
    }
    out
}
