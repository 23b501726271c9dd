//! List stored suggestions.

use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::models::{EntityKind, SuggestionRow};
use crate::text::ParsedContent;

use super::helpers::{load_document, truncate};

#[derive(Serialize)]
struct SuggestionOutput<'a> {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: EntityKind,
    entity_id: i32,
    entity_name: Option<String>,
    score: f64,
    sources: &'a [crate::models::CandidateSource],
    text: String,
}

/// Print the persisted suggestions of a document with the text they cover.
pub async fn cmd_suggestions(settings: &Settings, document_id: i32, json: bool) -> anyhow::Result<()> {
    let (ctx, doc, kind) = load_document(settings, document_id).await?;
    let rows: Vec<SuggestionRow> = ctx.suggestions().list_suggestions(document_id).await?;
    let catalog = ctx.entities().catalog().await?;

    let text = doc.text();
    let parsed = ParsedContent::parse(&text, kind);
    let inner: Vec<char> = parsed.inner_text().chars().collect();

    let outputs: Vec<SuggestionOutput<'_>> = rows
        .iter()
        .map(|row| {
            let start = row.start.min(inner.len());
            let end = row.end.clamp(start, inner.len());
            SuggestionOutput {
                start: row.start,
                end: row.end,
                kind: row.kind,
                entity_id: row.entity_id,
                entity_name: catalog.lookup(row.key()).map(|e| e.name),
                score: row.score,
                sources: &row.sources,
                text: inner[start..end].iter().collect(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    if outputs.is_empty() {
        let state = ctx.suggestions().get_state_hash(document_id).await?;
        if state.is_none() {
            println!(
                "{} Document {} has not been refreshed yet",
                style("!").yellow(),
                document_id
            );
        } else {
            println!("{} No suggestions for document {}", style("→").dim(), document_id);
        }
        return Ok(());
    }

    println!(
        "{} {} suggestions for '{}'",
        style("→").cyan(),
        outputs.len(),
        truncate(&doc.title, 50)
    );
    for out in &outputs {
        let sources: Vec<&str> = out.sources.iter().map(|s| s.as_str()).collect();
        println!(
            "  {:>6}..{:<6} {:<8} {:<30} {:.3}  {}  [{}]",
            out.start,
            out.end,
            out.kind.as_str(),
            truncate(
                out.entity_name.as_deref().unwrap_or("(deleted)"),
                30
            ),
            out.score,
            style(truncate(&out.text, 40)).bold(),
            sources.join(", ")
        );
    }

    Ok(())
}
