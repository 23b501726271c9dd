//! Candidate terms and the annotation spans they are derived from.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::entity::{EntityKey, EntityKind, EntityRef};

/// Where a candidate term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// A name or alternate spelling of the entity itself.
    EntityName,
    /// Text already annotated with the entity elsewhere in the same document.
    ExistingAnnotation,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityName => "entity_name",
            Self::ExistingAnnotation => "existing_annotation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entity_name" => Some(Self::EntityName),
            "existing_annotation" => Some(Self::ExistingAnnotation),
            _ => None,
        }
    }
}

/// A set of spellings that, found in a document, point at one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTerm {
    pub terms: BTreeSet<String>,
    pub kind: EntityKind,
    pub source: CandidateSource,
    pub entity: EntityRef,
}

impl CandidateTerm {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.entity.id)
    }
}

/// A character range already covered by an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExistingSpan {
    pub start: usize,
    pub end: usize,
}

/// Existing spans grouped per entity.
pub type ExistingSpans = BTreeMap<EntityKey, Vec<ExistingSpan>>;

/// An instance-level annotation as read from storage, resolved to its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceAnnotation {
    pub kind: EntityKind,
    pub entity_id: i32,
    pub start: usize,
    pub end: usize,
}

impl InstanceAnnotation {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.entity_id)
    }
}

/// Output of candidate collection for one document.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub terms: Vec<CandidateTerm>,
    pub existing: ExistingSpans,
}
