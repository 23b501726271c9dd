//! Span reduction and pruning of already-annotated ranges.

use crate::models::{ExistingSpan, ExistingSpans, MatchResult, SuggestionRow};

use super::matcher::Matches;

/// Merge overlapping or touching matches into a disjoint, ascending set.
///
/// A merged span keeps the best score and the union of sources of everything
/// it absorbed.
pub fn reduce_spans(mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
    matches.sort_by_key(|m| (m.start, m.end));

    let mut reduced: Vec<MatchResult> = Vec::with_capacity(matches.len());
    let mut iter = matches.into_iter();
    let Some(mut current) = iter.next() else {
        return reduced;
    };

    for next in iter {
        if next.start <= current.end {
            current.score = current.score.max(next.score);
            current.sources.extend(next.sources);
            current.end = current.end.max(next.end);
        } else {
            reduced.push(std::mem::replace(&mut current, next));
        }
    }
    reduced.push(current);

    reduced
}

/// Inclusive-bounds intersection: spans that merely touch still overlap.
pub fn overlaps(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> bool {
    !(b_start > a_end) && !(a_start > b_end)
}

/// Drop matches overlapping any existing span of the same entity.
pub fn prune_existing(matches: Vec<MatchResult>, existing: &[ExistingSpan]) -> Vec<MatchResult> {
    if existing.is_empty() {
        return matches;
    }
    matches
        .into_iter()
        .filter(|m| {
            !existing
                .iter()
                .any(|span| overlaps(m.start, m.end, span.start, span.end))
        })
        .collect()
}

/// Reduce and prune every entity group and flatten into storage rows.
pub fn build_rows(document_id: i32, matches: Matches, existing: &ExistingSpans) -> Vec<SuggestionRow> {
    let mut rows = Vec::new();

    for (key, group) in matches {
        let reduced = reduce_spans(group);
        let kept = match existing.get(&key) {
            Some(spans) => prune_existing(reduced, spans),
            None => reduced,
        };
        rows.extend(
            kept.into_iter()
                .map(|m| SuggestionRow::from_match(document_id, key, m)),
        );
    }

    rows
}
