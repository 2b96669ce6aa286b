use crate::{
    error::RestructError,
    model::RawWeatherReading,
    source::{file::FileSource, stdin::StdinSource},
};
use anyhow::Context;
use async_trait::async_trait;
use std::{fmt::Debug, path::Path};
use tracing::debug;

pub mod file;
pub mod stdin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Stdin => "stdin",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Somewhere a JSON document of raw readings can be read from.
#[async_trait]
pub trait ReadingSource: Send + Sync + Debug {
    fn kind(&self) -> SourceKind;

    /// Human-readable origin, used in error messages.
    fn describe(&self) -> String {
        self.kind().to_string()
    }

    async fn read_document(&self) -> anyhow::Result<String>;
}

/// Pick a source from an optional `--input` path; none or `-` means stdin.
pub fn source_from_arg(path: Option<&Path>) -> Box<dyn ReadingSource> {
    match path {
        Some(p) if p.as_os_str() != "-" => Box::new(FileSource::new(p)),
        _ => Box::new(StdinSource),
    }
}

/// Readings parsed from a document, remembering whether it held a single
/// object or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub readings: Vec<RawWeatherReading>,
    pub single: bool,
}

pub fn parse_document(json: &str) -> Result<ParsedDocument, RestructError> {
    // Decode to a Value first so the shape decides between object and array
    // and serde_json's field-level message survives.
    let value: serde_json::Value = serde_json::from_str(json)?;

    let doc = if value.is_array() {
        ParsedDocument { readings: serde_json::from_value(value)?, single: false }
    } else {
        let one: RawWeatherReading = serde_json::from_value(value)?;
        ParsedDocument { readings: vec![one], single: true }
    };

    debug!(count = doc.readings.len(), "parsed weather document");
    Ok(doc)
}

/// Parse one reading object or an array of them.
pub fn parse_readings(json: &str) -> Result<Vec<RawWeatherReading>, RestructError> {
    parse_document(json).map(|doc| doc.readings)
}

/// Read and parse everything `source` provides.
pub async fn load_readings(source: &dyn ReadingSource) -> anyhow::Result<ParsedDocument> {
    let body = source.read_document().await?;

    parse_document(&body)
        .with_context(|| format!("Failed to parse readings from {}", source.describe()))
}
