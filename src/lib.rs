//! annosuggest - annotation suggestions for historical document collections.
//!
//! Scans plain-text and HTML documents for near matches of known places,
//! persons and religions, and stores the proposed spans for a human annotator
//! to accept or reject.

#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod similarity;
pub mod suggest;
pub mod text;

pub use config::{Config, EngineConfig, Settings};
pub use error::{ConfigError, SuggestError};
pub use repository::DbContext;
pub use suggest::{RefreshOutcome, RefreshSummary, SuggestionEvent, SuggestionService};
