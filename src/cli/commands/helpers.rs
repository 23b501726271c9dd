//! Shared helper functions for CLI commands.

use crate::config::Settings;
use crate::models::{ContentType, Document};
use crate::repository::DbContext;

/// Truncate a string to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Load a document that the engine can parse, or explain why not.
pub async fn load_document(
    settings: &Settings,
    document_id: i32,
) -> anyhow::Result<(DbContext, Document, ContentType)> {
    let ctx = settings.create_db_context();
    let doc = ctx
        .documents()
        .get(document_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Document {} not found", document_id))?;
    let kind = doc.kind().ok_or_else(|| {
        anyhow::anyhow!(
            "Document {} has unsupported content type '{}'",
            document_id,
            doc.content_type
        )
    })?;
    Ok((ctx, doc, kind))
}
