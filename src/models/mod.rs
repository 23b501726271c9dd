//! Data models for the suggestion engine.

mod candidate;
mod document;
mod entity;
mod suggestion;

pub use candidate::{
    CandidateSet, CandidateSource, CandidateTerm, ExistingSpan, ExistingSpans, InstanceAnnotation,
};
pub use document::{ContentType, Document};
pub use entity::{EntityCatalog, EntityKey, EntityKind, EntityRef, Person, Place, Religion};
pub use suggestion::{DocumentSuggestionState, MatchResult, SuggestionRow};
