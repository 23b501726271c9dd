//! End-to-end refresh tests against a temporary SQLite database.

use annosuggest::config::EngineConfig;
use annosuggest::models::{
    CandidateSource, ContentType, Document, EntityKind, Person, Place, Religion, SuggestionRow,
};
use annosuggest::repository::DbContext;
use annosuggest::suggest::{overlaps, RefreshOutcome, SuggestionEvent, SuggestionService};
use annosuggest::SuggestError;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn engine() -> EngineConfig {
    EngineConfig {
        threshold: 0.9,
        max_ngram: 3,
        workers: 2,
    }
}

async fn empty_db() -> (DbContext, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ctx = DbContext::new(&dir.path().join("suggest.db"));
    ctx.init_schema().await.unwrap();
    (ctx, dir)
}

fn places() -> Vec<Place> {
    vec![
        Place {
            id: 7,
            name: "Beirut".into(),
            alternate_names: vec!["Bayrut".into(), "Berytus".into()],
        },
        Place {
            id: 8,
            name: "Sidon".into(),
            alternate_names: vec!["Saida".into()],
        },
    ]
}

fn persons() -> Vec<Person> {
    vec![Person {
        id: 3,
        name: "Fakhr al-Din".into(),
        time_range: Some("1572-1635".into()),
    }]
}

fn religions() -> Vec<Religion> {
    vec![Religion {
        id: 1,
        name: "Druze".into(),
    }]
}

fn documents() -> Vec<Document> {
    vec![
        Document::new(
            1,
            "Chronicle",
            "The emir Fakhr al-Din left Beirutt for Sidon.",
            ContentType::Plain,
        ),
        Document::new(2, "Scan", "%PDF-1.4", ContentType::Plain),
        Document::new(
            3,
            "Letter",
            "<p>Letters from <b>Bayrut</b> to the Druze elders</p>",
            ContentType::Html,
        ),
    ]
}

/// Seed storage; document 2 gets a content type the engine cannot read.
async fn seed(ctx: &DbContext, reverse: bool) {
    let entities = ctx.entities();
    let mut places = places();
    let mut docs = documents();
    if reverse {
        places.reverse();
        for p in &mut places {
            p.alternate_names.reverse();
        }
        docs.reverse();
    }

    for p in &places {
        entities.save_place(p).await.unwrap();
    }
    for p in &persons() {
        entities.save_person(p).await.unwrap();
    }
    for r in &religions() {
        entities.save_religion(r).await.unwrap();
    }
    for mut doc in docs {
        if doc.id == 2 {
            doc.content_type = "application/pdf".into();
        }
        ctx.documents().save(&doc).await.unwrap();
    }
}

async fn seeded_db() -> (DbContext, TempDir) {
    let (ctx, dir) = empty_db().await;
    seed(&ctx, false).await;
    (ctx, dir)
}

/// Run a full refresh, collecting every event emitted.
async fn refresh_all(
    service: &SuggestionService,
) -> (annosuggest::RefreshSummary, Vec<SuggestionEvent>) {
    let (event_tx, mut event_rx) = mpsc::channel(16);
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = event_rx.recv().await {
            events.push(event);
        }
        events
    });

    let summary = service.refresh_all(false, event_tx).await.unwrap();
    let events = collector.await.unwrap();
    (summary, events)
}

fn spans(rows: &[SuggestionRow]) -> Vec<(EntityKind, i32, usize, usize)> {
    rows.iter()
        .map(|r| (r.kind, r.entity_id, r.start, r.end))
        .collect()
}

#[tokio::test]
async fn test_first_refresh_writes_expected_suggestions() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    let (summary, _) = refresh_all(&service).await;
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.failed, 1);

    let chronicle = ctx.suggestions().list_suggestions(1).await.unwrap();
    assert_eq!(
        spans(&chronicle),
        vec![
            // "Fakhr al Din" as tokenised, against "Fakhr al-Din"
            (EntityKind::Person, 3, 9, 21),
            // "Beirutt" against "Beirut"
            (EntityKind::Place, 7, 27, 34),
            (EntityKind::Place, 8, 39, 44),
        ]
    );
    assert!(chronicle[0].score >= 0.9 && chronicle[0].score < 1.0);
    assert_eq!(chronicle[2].score, 1.0);
    assert!(chronicle
        .iter()
        .all(|r| r.sources == vec![CandidateSource::EntityName]));

    let letter = ctx.suggestions().list_suggestions(3).await.unwrap();
    assert_eq!(
        spans(&letter),
        vec![
            (EntityKind::Place, 7, 13, 19),
            (EntityKind::Religion, 1, 27, 32),
        ]
    );
}

#[tokio::test]
async fn test_second_refresh_is_a_no_op() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    refresh_all(&service).await;
    let first_rows = ctx.suggestions().list_suggestions(1).await.unwrap();
    let first_state = ctx.suggestions().get_state(1).await.unwrap().unwrap();

    let (summary, events) = refresh_all(&service).await;
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.failed, 1);
    assert!(events.contains(&SuggestionEvent::DocumentUnchanged { document_id: 1 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SuggestionEvent::DocumentCompleted { .. })));

    assert_eq!(ctx.suggestions().list_suggestions(1).await.unwrap(), first_rows);
    assert_eq!(
        ctx.suggestions().get_state(1).await.unwrap().unwrap(),
        first_state
    );
}

#[tokio::test]
async fn test_trigger_without_listener() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    let first = service.refresh_all_documents().await.unwrap();
    assert_eq!((first.updated, first.unchanged, first.failed), (2, 0, 1));
    assert_eq!(ctx.suggestions().list_suggestions(1).await.unwrap().len(), 3);

    let second = service.refresh_all_documents().await.unwrap();
    assert_eq!((second.updated, second.unchanged, second.failed), (0, 2, 1));
}

#[tokio::test]
async fn test_force_recomputes_unchanged_documents() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    refresh_all(&service).await;
    let before = ctx.suggestions().list_suggestions(3).await.unwrap();

    // Nobody listens; sends fail fast instead of blocking.
    let (event_tx, event_rx) = mpsc::channel(1);
    drop(event_rx);
    let summary = service.refresh_all(true, event_tx).await.unwrap();
    assert_eq!(summary.updated, 2);
    assert_eq!(ctx.suggestions().list_suggestions(3).await.unwrap(), before);

    let outcome = service.refresh_document(3, false).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Unchanged);
}

#[tokio::test]
async fn test_failing_document_does_not_stop_the_run() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    let (summary, events) = refresh_all(&service).await;
    assert_eq!(summary.total(), 3);

    let failed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SuggestionEvent::DocumentFailed { document_id, error } => Some((*document_id, error)),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, 2);
    assert!(failed[0].1.contains("application/pdf"));

    // Documents on both sides of the failure were written
    assert!(ctx.suggestions().get_state_hash(1).await.unwrap().is_some());
    assert!(ctx.suggestions().get_state_hash(3).await.unwrap().is_some());
    assert!(ctx.suggestions().get_state_hash(2).await.unwrap().is_none());

    assert_eq!(events.first(), Some(&SuggestionEvent::Started { total_documents: 3 }));
    assert_eq!(
        events.last(),
        Some(&SuggestionEvent::Complete {
            updated: 2,
            unchanged: 0,
            failed: 1,
        })
    );

    let err = service.refresh_document(2, false).await.unwrap_err();
    assert!(matches!(err, SuggestError::UnsupportedContentType(_)));
    let err = service.refresh_document(404, false).await.unwrap_err();
    assert!(matches!(err, SuggestError::DocumentNotFound(404)));
}

#[tokio::test]
async fn test_existing_annotations_are_pruned_and_reused() {
    let (ctx, _dir) = empty_db().await;
    seed(&ctx, false).await;
    ctx.documents()
        .save(&Document::new(
            4,
            "Annals",
            "Beirut was rebuilt. Later, Beirutt grew.",
            ContentType::Plain,
        ))
        .await
        .unwrap();
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();

    service.refresh_document(4, false).await.unwrap();
    assert_eq!(
        spans(&ctx.suggestions().list_suggestions(4).await.unwrap()),
        vec![(EntityKind::Place, 7, 0, 6), (EntityKind::Place, 7, 27, 34)]
    );

    // Annotating the first mention changes the inputs, so the next run
    // recomputes without forcing.
    ctx.documents()
        .add_annotation(4, EntityKind::Place, 7, 0, 6)
        .await
        .unwrap();
    // A time group over the second mention blocks nothing.
    ctx.documents()
        .add_time_group_annotation(4, 27, 40)
        .await
        .unwrap();

    let outcome = service.refresh_document(4, false).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Updated { .. }));

    let rows = ctx.suggestions().list_suggestions(4).await.unwrap();
    assert_eq!(spans(&rows), vec![(EntityKind::Place, 7, 27, 34)]);
    assert_eq!(
        rows[0].sources,
        vec![
            CandidateSource::EntityName,
            CandidateSource::ExistingAnnotation
        ]
    );

    let annotations = ctx.documents().list_instance_annotations(4).await.unwrap();
    for row in &rows {
        for a in annotations.iter().filter(|a| a.key() == row.key()) {
            assert!(!overlaps(row.start, row.end, a.start, a.end));
        }
    }
}

#[tokio::test]
async fn test_storage_order_does_not_change_results() {
    let (forward, _dir_a) = empty_db().await;
    seed(&forward, false).await;
    let (backward, _dir_b) = empty_db().await;
    seed(&backward, true).await;

    for ctx in [&forward, &backward] {
        let service = SuggestionService::new(ctx.clone(), engine()).unwrap();
        refresh_all(&service).await;
    }

    for id in [1, 3] {
        assert_eq!(
            forward.suggestions().list_suggestions(id).await.unwrap(),
            backward.suggestions().list_suggestions(id).await.unwrap()
        );
        assert_eq!(
            forward.suggestions().get_state_hash(id).await.unwrap(),
            backward.suggestions().get_state_hash(id).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_engine_change_forces_recompute() {
    let (ctx, _dir) = seeded_db().await;
    let service = SuggestionService::new(ctx.clone(), engine()).unwrap();
    refresh_all(&service).await;

    let mut strict = engine();
    strict.threshold = 0.95;
    let strict_service = SuggestionService::new(ctx.clone(), strict).unwrap();

    let outcome = strict_service.refresh_document(1, false).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Updated { .. }));

    // Near misses drop out; exact matches stay
    assert_eq!(
        spans(&ctx.suggestions().list_suggestions(1).await.unwrap()),
        vec![(EntityKind::Place, 8, 39, 44)]
    );
}

#[tokio::test]
async fn test_invalid_engine_rejected() {
    let (ctx, _dir) = empty_db().await;
    let mut bad = engine();
    bad.max_ngram = 0;
    assert!(matches!(
        SuggestionService::new(ctx, bad),
        Err(SuggestError::Config(_))
    ));
}
