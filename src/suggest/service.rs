//! Suggestion refresh driver.
//!
//! Orchestrates collection, change detection, matching, reduction and
//! persistence once per document. Separated from UI concerns: progress is
//! reported through `SuggestionEvent`s and the caller decides how to present it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::EngineConfig;
use crate::error::SuggestError;
use crate::models::EntityCatalog;
use crate::repository::DbContext;
use crate::text::{tokenize, ParsedContent};

use super::candidates::collect_candidates;
use super::hash::suggestion_hash;
use super::matcher::MatchPool;
use super::reduce::build_rows;
use super::types::{RefreshOutcome, RefreshSummary, SuggestionEvent};

/// Service computing and persisting annotation suggestions.
pub struct SuggestionService {
    ctx: DbContext,
    engine: EngineConfig,
    pool: Arc<MatchPool>,
}

impl SuggestionService {
    /// Create a new service; builds the matcher pool up front.
    pub fn new(ctx: DbContext, engine: EngineConfig) -> Result<Self, SuggestError> {
        engine.validate()?;
        let pool = MatchPool::new(engine.workers)?;
        Ok(Self {
            ctx,
            engine,
            pool: Arc::new(pool),
        })
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Refresh every document in storage.
    ///
    /// Unchanged documents are skipped. A failing document is logged and the
    /// run moves on to the next one. Only failures to load the entity catalog or
    /// the document list abort the run. Progress goes to the log only; use
    /// [`refresh_all`](Self::refresh_all) to observe events.
    pub async fn refresh_all_documents(&self) -> Result<RefreshSummary, SuggestError> {
        let (event_tx, event_rx) = mpsc::channel(1);
        drop(event_rx);
        self.refresh_all(false, event_tx).await
    }

    /// Refresh every document, reporting progress over `event_tx`.
    ///
    /// With `force`, documents whose hash did not change are recomputed too.
    pub async fn refresh_all(
        &self,
        force: bool,
        event_tx: mpsc::Sender<SuggestionEvent>,
    ) -> Result<RefreshSummary, SuggestError> {
        let catalog = self.ctx.entities().catalog().await?;
        let ids = self.ctx.documents().list_ids().await?;

        tracing::info!(
            "Refreshing suggestions for {} documents against {} entities",
            ids.len(),
            catalog.len()
        );

        let _ = event_tx
            .send(SuggestionEvent::Started {
                total_documents: ids.len(),
            })
            .await;

        let mut summary = RefreshSummary::default();

        for id in ids {
            let _ = event_tx
                .send(SuggestionEvent::DocumentStarted { document_id: id })
                .await;

            match self.refresh_with_catalog(&catalog, id, force).await {
                Ok(RefreshOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    let _ = event_tx
                        .send(SuggestionEvent::DocumentUnchanged { document_id: id })
                        .await;
                }
                Ok(RefreshOutcome::Updated {
                    suggestions,
                    candidates,
                    fragments,
                }) => {
                    summary.updated += 1;
                    let _ = event_tx
                        .send(SuggestionEvent::DocumentCompleted {
                            document_id: id,
                            suggestions,
                            candidates,
                            fragments,
                        })
                        .await;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Failed to refresh suggestions for document {}: {}", id, e);
                    let _ = event_tx
                        .send(SuggestionEvent::DocumentFailed {
                            document_id: id,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }

        let _ = event_tx
            .send(SuggestionEvent::Complete {
                updated: summary.updated,
                unchanged: summary.unchanged,
                failed: summary.failed,
            })
            .await;

        tracing::info!(
            "Suggestion refresh complete: {} updated, {} unchanged, {} failed",
            summary.updated,
            summary.unchanged,
            summary.failed
        );

        Ok(summary)
    }

    /// Refresh a single document.
    pub async fn refresh_document(
        &self,
        document_id: i32,
        force: bool,
    ) -> Result<RefreshOutcome, SuggestError> {
        let catalog = self.ctx.entities().catalog().await?;
        self.refresh_with_catalog(&catalog, document_id, force).await
    }

    async fn refresh_with_catalog(
        &self,
        catalog: &EntityCatalog,
        document_id: i32,
        force: bool,
    ) -> Result<RefreshOutcome, SuggestError> {
        let doc = self
            .ctx
            .documents()
            .get(document_id)
            .await?
            .ok_or(SuggestError::DocumentNotFound(document_id))?;
        let kind = doc
            .kind()
            .ok_or_else(|| SuggestError::UnsupportedContentType(doc.content_type.clone()))?;

        let text = doc.text();
        let parsed = ParsedContent::parse(&text, kind);
        let annotations = self
            .ctx
            .documents()
            .list_instance_annotations(document_id)
            .await?;
        let candidates = collect_candidates(catalog, &annotations, &parsed);

        let hash = suggestion_hash(
            &candidates.terms,
            &candidates.existing,
            &doc.content_digest(),
            &self.engine,
        )?;

        let suggestions = self.ctx.suggestions();
        if !force && suggestions.get_state_hash(document_id).await?.as_deref() == Some(hash.as_str()) {
            tracing::debug!("Document {} unchanged, skipping", document_id);
            return Ok(RefreshOutcome::Unchanged);
        }

        let fragments = tokenize(&parsed, self.engine.max_ngram);
        let fragment_count = fragments.len();
        let candidate_count = candidates.terms.len();

        let pool = Arc::clone(&self.pool);
        let threshold = self.engine.threshold;
        let terms = candidates.terms;
        let matches = tokio::task::spawn_blocking(move || pool.match_all(&terms, &fragments, threshold))
            .await
            .map_err(|e| SuggestError::Worker(e.to_string()))?;

        let rows = build_rows(document_id, matches, &candidates.existing);
        suggestions
            .replace_suggestions(document_id, &rows, &hash)
            .await?;

        tracing::debug!(
            "Document {}: {} suggestions from {} candidates over {} fragments",
            document_id,
            rows.len(),
            candidate_count,
            fragment_count
        );

        Ok(RefreshOutcome::Updated {
            suggestions: rows.len(),
            candidates: candidate_count,
            fragments: fragment_count,
        })
    }
}
