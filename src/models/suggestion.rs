//! Match results and persisted suggestion rows.

use std::collections::BTreeSet;

use super::candidate::CandidateSource;
use super::entity::{EntityKey, EntityKind};

/// One fuzzy hit of a candidate term against a document span.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub score: f64,
    pub sources: BTreeSet<CandidateSource>,
    pub start: usize,
    pub end: usize,
}

impl MatchResult {
    pub fn new(score: f64, source: CandidateSource, start: usize, end: usize) -> Self {
        Self {
            score,
            sources: BTreeSet::from([source]),
            start,
            end,
        }
    }
}

/// A suggestion as stored in `annotation_suggestion`.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub document_id: i32,
    pub start: usize,
    pub end: usize,
    pub sources: Vec<CandidateSource>,
    pub kind: EntityKind,
    pub entity_id: i32,
    pub score: f64,
}

impl SuggestionRow {
    pub fn from_match(document_id: i32, key: EntityKey, m: MatchResult) -> Self {
        Self {
            document_id,
            start: m.start,
            end: m.end,
            sources: m.sources.into_iter().collect(),
            kind: key.kind,
            entity_id: key.entity_id,
            score: m.score,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.entity_id)
    }
}

/// Stored change-detection state for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSuggestionState {
    pub document_id: i32,
    pub suggestion_hash: String,
}
