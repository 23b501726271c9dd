//! Document and annotation repository for SQLite.
//!
//! Documents are only read by the suggestion engine. The write methods exist
//! for seeding and for the surrounding application's annotation workflow.

use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{DocumentRecord, NewDocument};
use super::pool::{AsyncSqlitePool, DieselError, SqliteConn};
use super::util::{offset_from_db, offset_to_db};
use crate::models::{Document, EntityKind, InstanceAnnotation};
use crate::schema::{
    annotation, document, person_instance, place_instance, religion_instance, time_group,
};

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document {
            id: record.id,
            title: record.title,
            content: record.content,
            content_type: record.content_type,
        }
    }
}

#[derive(QueryableByName)]
struct InstanceAnnotationRow {
    #[diesel(sql_type = Integer)]
    span_start: i32,
    #[diesel(sql_type = Integer)]
    span_end: i32,
    #[diesel(sql_type = Text)]
    kind: String,
    #[diesel(sql_type = Integer)]
    entity_id: i32,
}

#[derive(QueryableByName)]
struct LastInsertId {
    #[diesel(sql_type = Integer)]
    id: i32,
}

/// Resolves every instance-level annotation of a document to the entity behind
/// it. Time-group annotations carry no entity and are excluded.
const INSTANCE_ANNOTATIONS_SQL: &str = r#"
    SELECT a.span_start AS span_start,
           a.span_end AS span_end,
           CASE
               WHEN pli.place_id IS NOT NULL THEN 'place'
               WHEN pei.person_id IS NOT NULL THEN 'person'
               ELSE 'religion'
           END AS kind,
           COALESCE(pli.place_id, pei.person_id, rei.religion_id) AS entity_id
    FROM annotation a
    LEFT JOIN place_instance pli ON pli.id = a.place_instance_id
    LEFT JOIN person_instance pei ON pei.id = a.person_instance_id
    LEFT JOIN religion_instance rei ON rei.id = a.religion_instance_id
    WHERE a.document_id = ?
      AND a.time_group_id IS NULL
      AND COALESCE(pli.place_id, pei.person_id, rei.religion_id) IS NOT NULL
    ORDER BY a.span_start, a.span_end, a.id
"#;

async fn last_insert_id(conn: &mut SqliteConn) -> Result<i32, DieselError> {
    let row: LastInsertId = diesel::sql_query("SELECT last_insert_rowid() AS id")
        .get_result(conn)
        .await?;
    Ok(row.id)
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: AsyncSqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a document's content and content type by id.
    pub async fn get(&self, id: i32) -> Result<Option<Document>, DieselError> {
        let mut conn = self.pool.get().await?;

        document::table
            .find(id)
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// All document ids, ascending.
    pub async fn list_ids(&self) -> Result<Vec<i32>, DieselError> {
        let mut conn = self.pool.get().await?;

        document::table
            .select(document::id)
            .order(document::id.asc())
            .load(&mut conn)
            .await
    }

    /// Insert or update a document, keeping its annotations.
    pub async fn save(&self, doc: &Document) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(document::table)
            .values(NewDocument {
                id: doc.id,
                title: &doc.title,
                content: &doc.content,
                content_type: &doc.content_type,
            })
            .on_conflict(document::id)
            .do_update()
            .set((
                document::title.eq(&doc.title),
                document::content.eq(doc.content.as_slice()),
                document::content_type.eq(&doc.content_type),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Instance-level annotations attached to a document, with their entity
    /// linkage and character span.
    pub async fn list_instance_annotations(
        &self,
        document_id: i32,
    ) -> Result<Vec<InstanceAnnotation>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<InstanceAnnotationRow> = diesel::sql_query(INSTANCE_ANNOTATIONS_SQL)
            .bind::<Integer, _>(document_id)
            .load(&mut conn)
            .await?;

        let mut annotations = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(kind) = EntityKind::from_str(&row.kind) else {
                continue;
            };
            annotations.push(InstanceAnnotation {
                kind,
                entity_id: row.entity_id,
                start: offset_from_db(row.span_start)?,
                end: offset_from_db(row.span_end)?,
            });
        }
        Ok(annotations)
    }

    /// Annotate `[start, end)` of a document with a new instance of an entity.
    /// Returns the annotation id.
    pub async fn add_annotation(
        &self,
        document_id: i32,
        kind: EntityKind,
        entity_id: i32,
        start: usize,
        end: usize,
    ) -> Result<i32, DieselError> {
        let span_start = offset_to_db(start)?;
        let span_end = offset_to_db(end)?;
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            async move {
                match kind {
                    EntityKind::Place => {
                        diesel::insert_into(place_instance::table)
                            .values(place_instance::place_id.eq(entity_id))
                            .execute(conn)
                            .await?;
                    }
                    EntityKind::Person => {
                        diesel::insert_into(person_instance::table)
                            .values(person_instance::person_id.eq(entity_id))
                            .execute(conn)
                            .await?;
                    }
                    EntityKind::Religion => {
                        diesel::insert_into(religion_instance::table)
                            .values(religion_instance::religion_id.eq(entity_id))
                            .execute(conn)
                            .await?;
                    }
                }
                let instance_id = last_insert_id(conn).await?;
                let link = match kind {
                    EntityKind::Place => AnnotationLink::Place(instance_id),
                    EntityKind::Person => AnnotationLink::Person(instance_id),
                    EntityKind::Religion => AnnotationLink::Religion(instance_id),
                };
                insert_annotation(conn, document_id, span_start, span_end, link).await
            }
            .scope_boxed()
        })
        .await
    }

    /// Annotate `[start, end)` of a document as part of a new time group.
    pub async fn add_time_group_annotation(
        &self,
        document_id: i32,
        start: usize,
        end: usize,
    ) -> Result<i32, DieselError> {
        let span_start = offset_to_db(start)?;
        let span_end = offset_to_db(end)?;
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(time_group::table)
                    .values(time_group::document_id.eq(document_id))
                    .execute(conn)
                    .await?;
                let group_id = last_insert_id(conn).await?;
                insert_annotation(
                    conn,
                    document_id,
                    span_start,
                    span_end,
                    AnnotationLink::TimeGroup(group_id),
                )
                .await
            }
            .scope_boxed()
        })
        .await
    }
}

/// The single row an annotation points at.
#[derive(Debug, Clone, Copy)]
enum AnnotationLink {
    Place(i32),
    Person(i32),
    Religion(i32),
    TimeGroup(i32),
}

async fn insert_annotation(
    conn: &mut SqliteConn,
    document_id: i32,
    span_start: i32,
    span_end: i32,
    link: AnnotationLink,
) -> Result<i32, DieselError> {
    let (place, person, religion, group) = match link {
        AnnotationLink::Place(id) => (Some(id), None, None, None),
        AnnotationLink::Person(id) => (None, Some(id), None, None),
        AnnotationLink::Religion(id) => (None, None, Some(id), None),
        AnnotationLink::TimeGroup(id) => (None, None, None, Some(id)),
    };

    diesel::insert_into(annotation::table)
        .values((
            annotation::document_id.eq(document_id),
            annotation::span_start.eq(span_start),
            annotation::span_end.eq(span_end),
            annotation::place_instance_id.eq(place),
            annotation::person_instance_id.eq(person),
            annotation::religion_instance_id.eq(religion),
            annotation::time_group_id.eq(group),
        ))
        .execute(conn)
        .await?;
    last_insert_id(conn).await
}
