//! Change-detection hash.
//!
//! The hash covers everything the suggestion set of a document depends on:
//! the candidate terms, the spans already annotated, the document body and the
//! matching parameters. Candidates are canonicalised first so storage row order
//! never changes the hash.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::EngineConfig;
use crate::error::SuggestError;
use crate::models::{CandidateSource, CandidateTerm, EntityKind, EntityRef, ExistingSpans};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
struct CanonicalTerm<'a> {
    kind: EntityKind,
    source: CandidateSource,
    entity: &'a EntityRef,
    /// Already sorted and deduplicated.
    terms: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct CanonicalExisting {
    kind: EntityKind,
    entity_id: i32,
    spans: Vec<(usize, usize)>,
}

#[derive(Debug, Serialize)]
struct HashInput<'a> {
    content: &'a str,
    threshold: f64,
    max_ngram: usize,
    terms: Vec<CanonicalTerm<'a>>,
    existing: Vec<CanonicalExisting>,
}

/// Order-independent SHA-256 (hex) of a document's matching inputs.
pub fn suggestion_hash(
    terms: &[CandidateTerm],
    existing: &ExistingSpans,
    content_digest: &str,
    engine: &EngineConfig,
) -> Result<String, SuggestError> {
    let mut canonical: Vec<CanonicalTerm<'_>> = terms
        .iter()
        .map(|t| CanonicalTerm {
            kind: t.kind,
            source: t.source,
            entity: &t.entity,
            terms: t.terms.iter().map(String::as_str).collect(),
        })
        .collect();
    canonical.sort();

    // BTreeMap iteration is already key-ordered.
    let existing = existing
        .iter()
        .map(|(key, spans)| {
            let mut spans: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
            spans.sort_unstable();
            CanonicalExisting {
                kind: key.kind,
                entity_id: key.entity_id,
                spans,
            }
        })
        .collect();

    let input = HashInput {
        content: content_digest,
        threshold: engine.threshold,
        max_ngram: engine.max_ngram,
        terms: canonical,
        existing,
    };

    let encoded = serde_json::to_vec(&input)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKey, ExistingSpan};
    use std::collections::BTreeSet;

    fn term(kind: EntityKind, id: i32, spellings: &[&str]) -> CandidateTerm {
        CandidateTerm {
            terms: spellings.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            kind,
            source: CandidateSource::EntityName,
            entity: EntityRef {
                id,
                name: spellings[0].to_string(),
                time_range: None,
            },
        }
    }

    fn engine() -> EngineConfig {
        EngineConfig {
            threshold: 0.9,
            max_ngram: 3,
            workers: 1,
        }
    }

    #[test]
    fn test_hash_is_order_independent() {
        let a = vec![
            term(EntityKind::Place, 1, &["Tyre", "Sur"]),
            term(EntityKind::Person, 2, &["Hiram"]),
            term(EntityKind::Religion, 3, &["Druze"]),
        ];
        let mut b = a.clone();
        b.reverse();

        let existing = ExistingSpans::new();
        assert_eq!(
            suggestion_hash(&a, &existing, "d", &engine()).unwrap(),
            suggestion_hash(&b, &existing, "d", &engine()).unwrap()
        );
    }

    #[test]
    fn test_hash_changes_with_inputs() {
        let terms = vec![term(EntityKind::Place, 1, &["Tyre"])];
        let existing = ExistingSpans::new();
        let base = suggestion_hash(&terms, &existing, "d", &engine()).unwrap();
        assert_eq!(base.len(), 64);

        let renamed = vec![term(EntityKind::Place, 1, &["Tyr"])];
        assert_ne!(base, suggestion_hash(&renamed, &existing, "d", &engine()).unwrap());

        assert_ne!(base, suggestion_hash(&terms, &existing, "other", &engine()).unwrap());

        let mut stricter = engine();
        stricter.threshold = 0.95;
        assert_ne!(base, suggestion_hash(&terms, &existing, "d", &stricter).unwrap());

        let mut annotated = ExistingSpans::new();
        annotated.insert(
            EntityKey::new(EntityKind::Place, 1),
            vec![ExistingSpan { start: 0, end: 4 }],
        );
        assert_ne!(base, suggestion_hash(&terms, &annotated, "d", &engine()).unwrap());
    }

    #[test]
    fn test_empty_inputs_do_not_hash_an_empty_buffer() {
        let existing = ExistingSpans::new();
        let empty_buffer = hex::encode(Sha256::digest(b""));

        let a = suggestion_hash(&[], &existing, "a", &engine()).unwrap();
        let b = suggestion_hash(&[], &existing, "b", &engine()).unwrap();
        assert_ne!(a, empty_buffer);
        assert_ne!(a, b);
    }

    #[test]
    fn test_worker_count_does_not_affect_hash() {
        let terms = vec![term(EntityKind::Place, 1, &["Tyre"])];
        let existing = ExistingSpans::new();
        let mut many = engine();
        many.workers = 16;
        assert_eq!(
            suggestion_hash(&terms, &existing, "d", &engine()).unwrap(),
            suggestion_hash(&terms, &existing, "d", &many).unwrap()
        );
    }
}
