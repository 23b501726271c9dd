//! Diesel ORM models for database tables.
//!
//! These records mirror `crate::schema` one-to-one and are converted to domain
//! types at the repository boundary.

use diesel::prelude::*;

use crate::schema;

/// Document record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::document)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRecord {
    pub id: i32,
    pub title: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// New document for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::document)]
pub struct NewDocument<'a> {
    pub id: i32,
    pub title: &'a str,
    pub content: &'a [u8],
    pub content_type: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::place)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlaceRecord {
    pub id: i32,
    pub name: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::place_alternate_name)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlaceAlternateNameRecord {
    pub place_id: i32,
    pub name: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::person)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PersonRecord {
    pub id: i32,
    pub name: String,
    pub time_range: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::religion)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReligionRecord {
    pub id: i32,
    pub name: String,
}

/// Suggestion record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::annotation_suggestion)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SuggestionRecord {
    pub id: i32,
    pub document_id: i32,
    pub span_start: i32,
    pub span_end: i32,
    /// JSON array of source names.
    pub source: String,
    pub entity_type: String,
    pub entity_id: i32,
    pub score: f64,
}

/// New suggestion for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::annotation_suggestion)]
pub struct NewSuggestion<'a> {
    pub document_id: i32,
    pub span_start: i32,
    pub span_end: i32,
    pub source: &'a str,
    pub entity_type: &'a str,
    pub entity_id: i32,
    pub score: f64,
}

/// Change-detection state record.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::annotation_suggestion_document_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SuggestionStateRecord {
    pub document_id: i32,
    pub suggestion_hash: String,
    pub updated_at: String,
}
