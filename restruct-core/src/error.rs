use thiserror::Error;

use crate::validate::ReadingIssue;

/// Errors produced while parsing, checking or restructuring readings.
#[derive(Debug, Error)]
pub enum RestructError {
    #[error("Timezone offset of {0} seconds is outside the representable range")]
    InvalidTimezoneOffset(i32),

    #[error("Timestamp `{field}` ({value}) cannot be represented as a date")]
    TimestampOutOfRange { field: &'static str, value: i64 },

    #[error("Invalid time format '{0}'")]
    InvalidTimeFormat(String),

    #[error("Failed to format timestamp")]
    Format(#[from] std::fmt::Error),

    #[error("Failed to parse weather reading JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Reading for '{name}' failed validation: {}", join_issues(.issues))]
    Invalid { name: String, issues: Vec<ReadingIssue> },

    #[error("Reading #{index} ('{name}'): {source}")]
    Reading {
        index: usize,
        name: String,
        #[source]
        source: Box<RestructError>,
    },
}

fn join_issues(issues: &[ReadingIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
