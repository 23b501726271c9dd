//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection factory and provides access to all repositories.

use std::path::Path;

use diesel_async::RunQueryDsl;

use super::document::DocumentRepository;
use super::entity::EntityRepository;
use super::pool::{AsyncSqlitePool, DieselError};
use super::suggestion::SuggestionRepository;

/// Database context that hands out repositories over one SQLite database.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:/srv/annosuggest.db");
/// ctx.init_schema().await?;
/// let ids = ctx.documents().list_ids().await?;
/// ```
#[derive(Clone, Debug)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a context from a database file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a context from a database URL (`sqlite:` prefix optional).
    pub fn from_url(url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(url),
        }
    }

    /// Get the underlying connection factory.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a document repository.
    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone())
    }

    /// Get an entity repository.
    pub fn entities(&self) -> EntityRepository {
        EntityRepository::new(self.pool.clone())
    }

    /// Get a suggestion repository.
    pub fn suggestions(&self) -> SuggestionRepository {
        SuggestionRepository::new(self.pool.clone())
    }

    /// Create all tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        let statements = [
            r#"CREATE TABLE IF NOT EXISTS document (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                content BLOB NOT NULL,
                content_type TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS place (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS place_alternate_name (
                id INTEGER PRIMARY KEY,
                place_id INTEGER NOT NULL REFERENCES place(id) ON DELETE CASCADE,
                name TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS person (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                time_range TEXT
            )"#,
            r#"CREATE TABLE IF NOT EXISTS religion (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS place_instance (
                id INTEGER PRIMARY KEY,
                place_id INTEGER NOT NULL REFERENCES place(id) ON DELETE CASCADE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS person_instance (
                id INTEGER PRIMARY KEY,
                person_id INTEGER NOT NULL REFERENCES person(id) ON DELETE CASCADE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS religion_instance (
                id INTEGER PRIMARY KEY,
                religion_id INTEGER NOT NULL REFERENCES religion(id) ON DELETE CASCADE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS time_group (
                id INTEGER PRIMARY KEY,
                document_id INTEGER NOT NULL REFERENCES document(id) ON DELETE CASCADE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS annotation (
                id INTEGER PRIMARY KEY,
                document_id INTEGER NOT NULL REFERENCES document(id) ON DELETE CASCADE,
                span_start INTEGER NOT NULL,
                span_end INTEGER NOT NULL,
                place_instance_id INTEGER REFERENCES place_instance(id) ON DELETE CASCADE,
                person_instance_id INTEGER REFERENCES person_instance(id) ON DELETE CASCADE,
                religion_instance_id INTEGER REFERENCES religion_instance(id) ON DELETE CASCADE,
                time_group_id INTEGER REFERENCES time_group(id) ON DELETE CASCADE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS annotation_suggestion (
                id INTEGER PRIMARY KEY,
                document_id INTEGER NOT NULL REFERENCES document(id) ON DELETE CASCADE,
                span_start INTEGER NOT NULL,
                span_end INTEGER NOT NULL,
                source TEXT NOT NULL,
                type TEXT NOT NULL,
                entity_id INTEGER NOT NULL,
                score DOUBLE NOT NULL DEFAULT 0
            )"#,
            r#"CREATE TABLE IF NOT EXISTS annotation_suggestion_document_state (
                document_id INTEGER PRIMARY KEY REFERENCES document(id) ON DELETE CASCADE,
                suggestion_hash TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            "CREATE INDEX IF NOT EXISTS idx_place_alternate_name_place ON place_alternate_name(place_id)",
            "CREATE INDEX IF NOT EXISTS idx_annotation_document ON annotation(document_id)",
            "CREATE INDEX IF NOT EXISTS idx_annotation_suggestion_document ON annotation_suggestion(document_id)",
        ];

        for stmt in statements {
            diesel::sql_query(stmt).execute(&mut conn).await?;
        }

        Ok(())
    }

    /// Get list of all tables in the database.
    pub async fn list_tables(&self) -> Result<Vec<String>, DieselError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<TableName> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .load(&mut conn)
        .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}

#[derive(diesel::QueryableByName)]
struct TableName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}
