//! Candidate term collection.
//!
//! Every known entity contributes one candidate with all of its spellings.
//! Every entity annotation already present in the document contributes one
//! more candidate whose only term is the annotated text, so other mentions
//! written the same way are found too.

use std::collections::BTreeSet;

use crate::models::{
    CandidateSet, CandidateSource, CandidateTerm, EntityCatalog, EntityKind, EntityRef,
    ExistingSpan, InstanceAnnotation,
};
use crate::text::ParsedContent;

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn term_set<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    names
        .into_iter()
        .map(normalize_term)
        .filter(|t| !t.is_empty())
        .collect()
}

fn push_candidate(
    out: &mut Vec<CandidateTerm>,
    terms: BTreeSet<String>,
    kind: EntityKind,
    source: CandidateSource,
    entity: EntityRef,
) {
    if terms.is_empty() {
        return;
    }
    out.push(CandidateTerm {
        terms,
        kind,
        source,
        entity,
    });
}

/// Build the candidate set for one document.
///
/// `annotations` are the document's instance-level annotations; spans past the
/// end of the text are clamped when reading the annotated substring.
pub fn collect_candidates(
    catalog: &EntityCatalog,
    annotations: &[InstanceAnnotation],
    parsed: &ParsedContent,
) -> CandidateSet {
    let mut set = CandidateSet::default();

    for place in &catalog.places {
        let names = std::iter::once(place.name.as_str())
            .chain(place.alternate_names.iter().map(String::as_str));
        push_candidate(
            &mut set.terms,
            term_set(names),
            EntityKind::Place,
            CandidateSource::EntityName,
            EntityRef::from(place),
        );
    }

    for person in &catalog.persons {
        push_candidate(
            &mut set.terms,
            term_set([person.name.as_str()]),
            EntityKind::Person,
            CandidateSource::EntityName,
            EntityRef::from(person),
        );
    }

    for religion in &catalog.religions {
        push_candidate(
            &mut set.terms,
            term_set([religion.name.as_str()]),
            EntityKind::Religion,
            CandidateSource::EntityName,
            EntityRef::from(religion),
        );
    }

    if annotations.is_empty() {
        return set;
    }

    let text: Vec<char> = parsed.inner_text().chars().collect();

    for annotation in annotations {
        let key = annotation.key();
        set.existing.entry(key).or_default().push(ExistingSpan {
            start: annotation.start,
            end: annotation.end,
        });

        // An instance whose entity has since been deleted still blocks its
        // span but no longer yields a term.
        let Some(entity) = catalog.lookup(key) else {
            continue;
        };

        let start = annotation.start.min(text.len());
        let end = annotation.end.clamp(start, text.len());
        let covered: String = text[start..end].iter().collect();

        push_candidate(
            &mut set.terms,
            term_set([covered.as_str()]),
            annotation.kind,
            CandidateSource::ExistingAnnotation,
            entity,
        );
    }

    for spans in set.existing.values_mut() {
        spans.sort();
    }

    set
}
