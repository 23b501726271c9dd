//! Annotation suggestion pipeline.
//!
//! candidates -> matcher -> reduce -> persistence, with a hash-based fast
//! path that skips documents whose inputs did not change.

pub mod candidates;
pub mod hash;
pub mod matcher;
pub mod reduce;
mod service;
mod types;

pub use candidates::{collect_candidates, normalize_term};
pub use hash::suggestion_hash;
pub use matcher::{match_term, MatchPool, Matches};
pub use reduce::{build_rows, overlaps, prune_existing, reduce_spans};
pub use service::SuggestionService;
pub use types::{RefreshOutcome, RefreshSummary, SuggestionEvent};
