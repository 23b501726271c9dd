//! Parallel fuzzy matcher.
//!
//! One unit of work is one candidate term scored against every fragment of a
//! document. Units share only read-only inputs and are merged by entity key
//! once all of them finish, so submission order never affects the result.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::SuggestError;
use crate::models::{CandidateTerm, EntityKey, MatchResult};
use crate::similarity::{max_ratio, ratio_chars};
use crate::text::TextFragment;

/// Raw matches grouped per entity.
pub type Matches = BTreeMap<EntityKey, Vec<MatchResult>>;

/// A fragment pre-split into characters for the similarity kernel.
#[derive(Debug, Clone)]
pub struct PreparedFragment {
    chars: Vec<char>,
    start: usize,
    end: usize,
}

impl From<&TextFragment> for PreparedFragment {
    fn from(fragment: &TextFragment) -> Self {
        Self {
            chars: fragment.text.chars().collect(),
            start: fragment.start,
            end: fragment.end,
        }
    }
}

pub fn prepare(fragments: &[TextFragment]) -> Vec<PreparedFragment> {
    fragments.iter().map(PreparedFragment::from).collect()
}

/// Score every spelling of one candidate against every fragment and keep the
/// hits at or above `threshold`.
pub fn match_term(
    term: &CandidateTerm,
    fragments: &[PreparedFragment],
    threshold: f64,
) -> Vec<MatchResult> {
    let mut hits = Vec::new();

    for spelling in &term.terms {
        let chars: Vec<char> = spelling.chars().collect();
        for fragment in fragments {
            if max_ratio(chars.len(), fragment.chars.len()) < threshold {
                continue;
            }
            let score = ratio_chars(&chars, &fragment.chars);
            if score >= threshold {
                hits.push(MatchResult::new(
                    score,
                    term.source,
                    fragment.start,
                    fragment.end,
                ));
            }
        }
    }

    hits
}

/// Fold per-term results into the per-entity map.
pub fn merge_matches(results: impl IntoIterator<Item = (EntityKey, Vec<MatchResult>)>) -> Matches {
    let mut merged = Matches::new();
    for (key, hits) in results {
        if hits.is_empty() {
            continue;
        }
        merged.entry(key).or_default().extend(hits);
    }
    merged
}

/// Bounded worker pool running the matcher.
pub struct MatchPool {
    pool: ThreadPool,
}

impl MatchPool {
    pub fn new(workers: usize) -> Result<Self, SuggestError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("annosuggest-match-{}", i))
            .build()
            .map_err(|e| SuggestError::Worker(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every candidate against the fragments and wait for all of them.
    pub fn match_all(
        &self,
        terms: &[CandidateTerm],
        fragments: &[TextFragment],
        threshold: f64,
    ) -> Matches {
        let prepared = prepare(fragments);

        let results: Vec<(EntityKey, Vec<MatchResult>)> = self.pool.install(|| {
            terms
                .par_iter()
                .map(|term| (term.key(), match_term(term, &prepared, threshold)))
                .collect()
        });

        merge_matches(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateSource, EntityKind, EntityRef};
    use crate::suggest::reduce::reduce_spans;

    fn term(kind: EntityKind, id: i32, spellings: &[&str], source: CandidateSource) -> CandidateTerm {
        CandidateTerm {
            terms: spellings.iter().map(|s| s.to_string()).collect(),
            kind,
            source,
            entity: EntityRef {
                id,
                name: spellings[0].to_string(),
                time_range: None,
            },
        }
    }

    fn fragment(text: &str, start: usize) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
        }
    }

    #[test]
    fn test_near_match_kept_and_distant_dropped() {
        let beirut = term(EntityKind::Place, 7, &["Beirut"], CandidateSource::EntityName);
        let fragments = prepare(&[fragment("Beirutt", 0), fragment("Paris", 8)]);

        let hits = match_term(&beirut, &fragments, 0.9);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score >= 0.9);
        assert_eq!((hits[0].start, hits[0].end), (0, 7));
    }

    #[test]
    fn test_every_spelling_is_tried() {
        let t = term(
            EntityKind::Place,
            7,
            &["Beirut", "Berytus"],
            CandidateSource::EntityName,
        );
        let fragments = prepare(&[fragment("Berytus", 3)]);
        let hits = match_term(&t, &fragments, 0.9);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn test_case_sensitive() {
        let t = term(EntityKind::Place, 1, &["Tyre"], CandidateSource::EntityName);
        let hits = match_term(&t, &prepare(&[fragment("TYRE", 0)]), 0.9);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_merge_groups_by_entity() {
        let pool = MatchPool::new(2).unwrap();
        let terms = vec![
            term(EntityKind::Place, 7, &["Beirut"], CandidateSource::EntityName),
            term(EntityKind::Place, 7, &["Beirut"], CandidateSource::ExistingAnnotation),
            term(EntityKind::Person, 7, &["Paris"], CandidateSource::EntityName),
            term(EntityKind::Religion, 2, &["Druze"], CandidateSource::EntityName),
        ];
        let fragments = vec![fragment("Beirut", 0), fragment("Paris", 7)];

        let matches = pool.match_all(&terms, &fragments, 0.9);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[&EntityKey::new(EntityKind::Place, 7)].len(), 2);
        assert_eq!(matches[&EntityKey::new(EntityKind::Person, 7)].len(), 1);
        assert!(!matches.contains_key(&EntityKey::new(EntityKind::Religion, 2)));
    }

    #[test]
    fn test_submission_order_does_not_matter() {
        let pool = MatchPool::new(4).unwrap();
        let mut terms = vec![
            term(EntityKind::Place, 1, &["Sidon", "Saida"], CandidateSource::EntityName),
            term(EntityKind::Place, 1, &["Sidon"], CandidateSource::ExistingAnnotation),
            term(EntityKind::Place, 2, &["Tyre"], CandidateSource::EntityName),
            term(EntityKind::Person, 5, &["Hiram of Tyre"], CandidateSource::EntityName),
        ];
        let fragments = vec![
            fragment("Sidon", 0),
            fragment("Saida", 6),
            fragment("Hiram", 12),
            fragment("Hiram of", 12),
            fragment("Hiram of Tyre", 12),
            fragment("of", 18),
            fragment("of Tyre", 18),
            fragment("Tyre", 21),
        ];

        let reduce = |matches: Matches| -> Vec<(EntityKey, Vec<MatchResult>)> {
            matches
                .into_iter()
                .map(|(k, v)| (k, reduce_spans(v)))
                .collect()
        };

        let forward = reduce(pool.match_all(&terms, &fragments, 0.9));
        terms.reverse();
        let backward = reduce(pool.match_all(&terms, &fragments, 0.9));
        terms.swap(0, 2);
        let shuffled = reduce(pool.match_all(&terms, &fragments, 0.9));

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
        assert_eq!(forward.len(), 3);
    }
}
