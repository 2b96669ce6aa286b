//! Core library for the `restruct` CLI.
//!
//! This crate defines:
//! - The raw weather reading as a provider emits it, and its flattened form
//! - The mapping between the two, with configurable timestamp formatting
//! - Opt-in validation of what a reading is expected to satisfy
//! - Input sources and named formatting profiles
//!
//! It is used by `restruct-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod restructure;
pub mod source;
pub mod validate;

pub use config::{Config, ProfileConfig};
pub use error::RestructError;
pub use model::{NormalizedWeatherReading, RawWeatherReading};
pub use restructure::{Clock, FormatOptions, restructure, restructure_all};
pub use source::{ReadingSource, SourceKind};
pub use validate::{ReadingIssue, check};
