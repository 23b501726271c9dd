//! Suggestion repository: persisted suggestions and per-document hash state.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{NewSuggestion, SuggestionRecord, SuggestionStateRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{offset_from_db, offset_to_db, to_diesel_error};
use crate::models::{CandidateSource, DocumentSuggestionState, EntityKind, SuggestionRow};
use crate::schema::{annotation_suggestion, annotation_suggestion_document_state};

impl TryFrom<SuggestionRecord> for SuggestionRow {
    type Error = DieselError;

    fn try_from(record: SuggestionRecord) -> Result<Self, Self::Error> {
        let sources: Vec<CandidateSource> =
            serde_json::from_str(&record.source).map_err(to_diesel_error)?;
        let kind = EntityKind::from_str(&record.entity_type).ok_or_else(|| {
            to_diesel_error(format!("unknown entity type '{}'", record.entity_type))
        })?;

        Ok(SuggestionRow {
            document_id: record.document_id,
            start: offset_from_db(record.span_start)?,
            end: offset_from_db(record.span_end)?,
            sources,
            kind,
            entity_id: record.entity_id,
            score: record.score,
        })
    }
}

#[derive(Clone)]
pub struct SuggestionRepository {
    pool: AsyncSqlitePool,
}

impl SuggestionRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Stored change-detection hash for a document, if it was ever refreshed.
    pub async fn get_state_hash(&self, document_id: i32) -> Result<Option<String>, DieselError> {
        Ok(self.get_state(document_id).await?.map(|s| s.suggestion_hash))
    }

    pub async fn get_state(
        &self,
        document_id: i32,
    ) -> Result<Option<DocumentSuggestionState>, DieselError> {
        let mut conn = self.pool.get().await?;

        annotation_suggestion_document_state::table
            .find(document_id)
            .select(SuggestionStateRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| {
                opt.map(|r| DocumentSuggestionState {
                    document_id: r.document_id,
                    suggestion_hash: r.suggestion_hash,
                })
            })
    }

    /// Persisted suggestions for a document, ordered by span then entity.
    pub async fn list_suggestions(
        &self,
        document_id: i32,
    ) -> Result<Vec<SuggestionRow>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<SuggestionRecord> = annotation_suggestion::table
            .filter(annotation_suggestion::document_id.eq(document_id))
            .select(SuggestionRecord::as_select())
            .order((
                annotation_suggestion::span_start.asc(),
                annotation_suggestion::span_end.asc(),
                annotation_suggestion::entity_type.asc(),
                annotation_suggestion::entity_id.asc(),
            ))
            .load(&mut conn)
            .await?;

        records.into_iter().map(SuggestionRow::try_from).collect()
    }

    /// Replace the whole suggestion set of a document and record its hash.
    ///
    /// Runs in one transaction: on any error the previous rows and hash stay
    /// in place.
    pub async fn replace_suggestions(
        &self,
        document_id: i32,
        rows: &[SuggestionRow],
        suggestion_hash: &str,
    ) -> Result<(), DieselError> {
        // Encode up front so a bad row fails before the transaction starts.
        let mut encoded = Vec::with_capacity(rows.len());
        for row in rows {
            let source = serde_json::to_string(&row.sources).map_err(to_diesel_error)?;
            encoded.push((
                offset_to_db(row.start)?,
                offset_to_db(row.end)?,
                source,
                row.kind.as_str(),
                row.entity_id,
                row.score,
            ));
        }

        let state = SuggestionStateRecord {
            document_id,
            suggestion_hash: suggestion_hash.to_string(),
            updated_at: Utc::now().to_rfc3339(),
        };

        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    annotation_suggestion::table
                        .filter(annotation_suggestion::document_id.eq(document_id)),
                )
                .execute(conn)
                .await?;

                // SQLite doesn't support batch insert with diesel-async, insert one at a time
                for (span_start, span_end, source, entity_type, entity_id, score) in &encoded {
                    diesel::insert_into(annotation_suggestion::table)
                        .values(NewSuggestion {
                            document_id,
                            span_start: *span_start,
                            span_end: *span_end,
                            source,
                            entity_type,
                            entity_id: *entity_id,
                            score: *score,
                        })
                        .execute(conn)
                        .await?;
                }

                diesel::delete(annotation_suggestion_document_state::table.find(document_id))
                    .execute(conn)
                    .await?;

                diesel::insert_into(annotation_suggestion_document_state::table)
                    .values(&state)
                    .execute(conn)
                    .await?;

                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Document};
    use crate::repository::DbContext;
    use tempfile::tempdir;

    fn row(document_id: i32, start: usize, end: usize, entity_id: i32) -> SuggestionRow {
        SuggestionRow {
            document_id,
            start,
            end,
            sources: vec![CandidateSource::EntityName, CandidateSource::ExistingAnnotation],
            kind: EntityKind::Place,
            entity_id,
            score: 0.95,
        }
    }

    async fn setup() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        ctx.documents()
            .save(&Document::new(1, "d", "text", ContentType::Plain))
            .await
            .unwrap();
        ctx.documents()
            .save(&Document::new(2, "e", "text", ContentType::Plain))
            .await
            .unwrap();
        (ctx, dir)
    }

    #[tokio::test]
    async fn test_replace_and_list() {
        let (ctx, _dir) = setup().await;
        let repo = ctx.suggestions();

        assert!(repo.get_state_hash(1).await.unwrap().is_none());

        repo.replace_suggestions(1, &[row(1, 10, 20, 7), row(1, 0, 4, 3)], "h1")
            .await
            .unwrap();
        repo.replace_suggestions(2, &[row(2, 5, 6, 7)], "h2")
            .await
            .unwrap();

        let listed = repo.list_suggestions(1).await.unwrap();
        assert_eq!(listed, vec![row(1, 0, 4, 3), row(1, 10, 20, 7)]);
        assert_eq!(repo.get_state_hash(1).await.unwrap().as_deref(), Some("h1"));

        // Replacing drops the previous set entirely
        repo.replace_suggestions(1, &[], "h3").await.unwrap();
        assert!(repo.list_suggestions(1).await.unwrap().is_empty());
        assert_eq!(repo.get_state_hash(1).await.unwrap().as_deref(), Some("h3"));

        // Other documents are untouched
        assert_eq!(repo.list_suggestions(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_replace_rolls_back_same_document() {
        let (ctx, _dir) = setup().await;
        let repo = ctx.suggestions();

        let before = vec![row(1, 0, 4, 3), row(1, 10, 20, 7)];
        repo.replace_suggestions(1, &before, "before").await.unwrap();

        // Fail the last write of the transaction, after the old rows are
        // already deleted and the new ones inserted.
        let mut conn = ctx.pool().get().await.unwrap();
        diesel::sql_query(
            "CREATE TRIGGER fail_state_insert \
             BEFORE INSERT ON annotation_suggestion_document_state \
             BEGIN SELECT RAISE(ABORT, 'state write failed'); END",
        )
        .execute(&mut conn)
        .await
        .unwrap();

        let result = repo
            .replace_suggestions(1, &[row(1, 30, 35, 8)], "after")
            .await;
        assert!(result.is_err());

        assert_eq!(repo.list_suggestions(1).await.unwrap(), before);
        assert_eq!(
            repo.get_state_hash(1).await.unwrap().as_deref(),
            Some("before")
        );
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_other_documents() {
        let (ctx, _dir) = setup().await;
        let repo = ctx.suggestions();

        repo.replace_suggestions(1, &[row(1, 0, 4, 3)], "before")
            .await
            .unwrap();

        // Document 99 does not exist, so the first insert violates the
        // foreign key.
        let err = repo.replace_suggestions(99, &[row(99, 1, 2, 3)], "x").await;
        assert!(err.is_err());
        assert!(repo.list_suggestions(99).await.unwrap().is_empty());
        assert!(repo.get_state_hash(99).await.unwrap().is_none());

        assert_eq!(repo.list_suggestions(1).await.unwrap().len(), 1);
        assert_eq!(
            repo.get_state_hash(1).await.unwrap().as_deref(),
            Some("before")
        );
    }
}
